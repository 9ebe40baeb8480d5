use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use std::{
    collections::BTreeSet,
    error::Error,
    fs::File,
    io::{self, Write},
    path::PathBuf,
};
use tracing_subscriber::EnvFilter;
use yogalog::{
    catalog::{filter_poses, recommended_poses, NewPose, PoseId},
    config::{Config, ConfigStore, FileConfigStore},
    dashboard::{month_view, Dashboard, DashboardOptions, SessionFilter, YearMonth},
    dosha::{Dosha, DoshaProfile, DoshaResult, QuestionBank},
    export::export_sessions_csv,
    quiz::DoshaQuiz,
    session::{SessionDraft, DATE_FORMAT, TIME_FORMAT},
    store::{JournalDb, OfflineStore, PracticeStore},
    JournalError,
};

const LOG_ENV: &str = "YOGALOG_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";
const PROGRESS_BAR_WIDTH: usize = 20;

/// yoga practice journal with dashboard statistics and a dosha self-assessment
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Log yoga practice sessions, review monthly statistics and a practice calendar, browse the pose catalog, and take a dosha self-assessment that recommends poses."
)]
pub struct Cli {
    /// journal database to use (defaults to the platform state directory)
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    /// config file to read
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// record a practice session
    Log(LogArgs),
    /// list recorded sessions
    Sessions(FilterArgs),
    /// headline statistics, top poses and locations for a month
    Stats {
        /// month to view as YYYY-MM (defaults to the current month)
        #[clap(short, long)]
        month: Option<YearMonth>,
        #[clap(flatten)]
        filter: FilterArgs,
    },
    /// month calendar marking practice days
    Calendar {
        /// month to view as YYYY-MM (defaults to the current month)
        #[clap(short, long)]
        month: Option<YearMonth>,
    },
    /// sessions grouped by location
    Locations,
    /// browse and edit the pose catalog
    #[clap(subcommand)]
    Poses(PosesCommand),
    /// dosha self-assessment
    #[clap(subcommand)]
    Dosha(DoshaCommand),
    /// write all sessions to a CSV file
    Export {
        /// destination file
        path: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct LogArgs {
    /// practice date as YYYY-MM-DD (defaults to today)
    #[clap(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// start time as HH:MM (defaults to now)
    #[clap(long, value_parser = parse_time)]
    time: Option<NaiveTime>,

    /// studio or venue
    #[clap(short, long, default_value = "")]
    location: String,

    /// instructor name
    #[clap(short, long, default_value = "")]
    instructor: String,

    /// pose practiced; repeat for several
    #[clap(short, long = "pose")]
    poses: Vec<String>,

    /// practice style, e.g. vinyasa
    #[clap(long, default_value = "")]
    style: String,

    /// how the session felt
    #[clap(long, default_value = "")]
    reflection: String,

    /// anything else worth remembering
    #[clap(long, default_value = "")]
    notes: String,

    /// satisfaction from 1 to 5
    #[clap(short, long, default_value_t = 5)]
    satisfaction: u8,

    /// photo or video reference; repeat for several
    #[clap(long = "media")]
    media: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// only sessions at this location
    #[clap(long, conflicts_with_all = ["by_instructor", "by_style"])]
    by_location: Option<String>,

    /// only sessions with this instructor
    #[clap(long, conflicts_with = "by_style")]
    by_instructor: Option<String>,

    /// only sessions of this style
    #[clap(long)]
    by_style: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> SessionFilter {
        match (&self.by_location, &self.by_instructor, &self.by_style) {
            (Some(v), _, _) => SessionFilter::Location(v.clone()),
            (_, Some(v), _) => SessionFilter::Instructor(v.clone()),
            (_, _, Some(v)) => SessionFilter::Style(v.clone()),
            _ => SessionFilter::All,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
enum PosesCommand {
    /// list poses, seeding the default catalog on first use
    List {
        /// only poses for this dosha
        #[clap(short, long, value_enum)]
        dosha: Option<Dosha>,
        /// case-insensitive search on either name
        #[clap(short, long, default_value = "")]
        search: String,
    },
    /// add a custom pose
    Add {
        #[clap(long)]
        name: String,
        #[clap(long, default_value = "")]
        name_en: String,
        #[clap(long)]
        description: String,
        #[clap(long, value_enum)]
        dosha: Dosha,
        /// repeat for several benefits
        #[clap(long = "benefit")]
        benefits: Vec<String>,
        #[clap(long)]
        image: Option<String>,
    },
    /// delete a pose by id
    Delete { id: i64 },
    /// seed the default catalog if it is missing
    Seed,
}

#[derive(Subcommand, Debug, Clone)]
enum DoshaCommand {
    /// print the questionnaire
    Questions {
        #[clap(short, long, value_enum)]
        dosha: Option<Dosha>,
    },
    /// score the ids of the statements that apply to you
    Score {
        #[clap(required = true)]
        ids: Vec<u32>,
        /// print the result as JSON instead of a report
        #[clap(long)]
        json: bool,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|e| format!("expected HH:MM: {e}"))
}

fn init_logging() {
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    let env_filter =
        EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn open_store(db: Option<PathBuf>, config: &Config) -> Box<dyn PracticeStore> {
    match db.or_else(|| config.database_path()) {
        Some(path) => match JournalDb::open(&path) {
            Ok(db) => Box::new(db),
            Err(e) => {
                tracing::warn!("cannot open journal at {}: {e}", path.display());
                Box::new(OfflineStore::new())
            }
        },
        None => Box::new(OfflineStore::new()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let cli = Cli::parse();

    let config_store = cli
        .config
        .as_ref()
        .map_or_else(FileConfigStore::new, FileConfigStore::with_path);
    let config = config_store.load();
    tracing::debug!("loaded config from {}", config_store.path().display());

    let mut store = open_store(cli.db.clone(), &config);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli.command, &config, store.as_mut(), &mut out)
}

fn current_month() -> YearMonth {
    YearMonth::from_date(Local::now().date_naive())
}

fn run(
    command: Command,
    config: &Config,
    store: &mut dyn PracticeStore,
    out: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Log(args) => log_session(args, store, out)?,
        Command::Sessions(filter) => {
            let sessions = filter.to_filter().apply(&store.list_sessions()?);
            if sessions.is_empty() {
                writeln!(out, "no sessions recorded")?;
            }
            for s in &sessions {
                writeln!(
                    out,
                    "#{} {} {} {} ({}) {} [{}] {}/5",
                    s.id,
                    s.date.format(DATE_FORMAT),
                    s.time.format(TIME_FORMAT),
                    s.location,
                    s.instructor,
                    s.style,
                    s.poses.join(", "),
                    s.satisfaction.get()
                )?;
            }
        }
        Command::Stats { month, filter } => {
            let sessions = filter.to_filter().apply(&store.list_sessions()?);
            let options = DashboardOptions::from(config);
            let dashboard = Dashboard::build(&sessions, month.unwrap_or_else(current_month), &options);
            print_dashboard(&dashboard, &options, out)?;
        }
        Command::Calendar { month } => {
            let sessions = store.list_sessions()?;
            print_calendar(&sessions, month.unwrap_or_else(current_month), out)?;
        }
        Command::Locations => {
            let sessions = store.list_sessions()?;
            let dashboard = Dashboard::build(&sessions, current_month(), &DashboardOptions::from(config));
            for group in &dashboard.locations {
                writeln!(out, "{} ({})", display_or_dash(group.location), group.sessions.len())?;
                for s in &group.sessions {
                    writeln!(out, "  {} {}", s.date.format(DATE_FORMAT), s.style)?;
                }
            }
        }
        Command::Poses(cmd) => run_poses(cmd, store, out)?,
        Command::Dosha(cmd) => run_dosha(cmd, store, out)?,
        Command::Export { path } => {
            let sessions = store.list_sessions()?;
            export_sessions_csv(&sessions, File::create(&path)?)?;
            writeln!(out, "exported {} sessions to {}", sessions.len(), path.display())?;
        }
    }
    Ok(())
}

fn log_session(
    args: LogArgs,
    store: &mut dyn PracticeStore,
    out: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    let mut draft = SessionDraft::default();
    if let Some(date) = args.date {
        draft.date = date;
    }
    if let Some(time) = args.time {
        draft.time = time;
    }
    draft.location = args.location;
    draft.instructor = args.instructor;
    draft.style = args.style;
    draft.reflection = args.reflection;
    draft.notes = args.notes;
    draft.satisfaction = args.satisfaction;
    for pose in &args.poses {
        if !draft.add_pose(pose) {
            tracing::warn!("skipping blank or repeated pose {pose:?}");
        }
    }
    for media in args.media {
        draft.add_media(media);
    }

    let session = store.add_session(&draft.build()?)?;
    writeln!(
        out,
        "recorded session #{} on {}",
        session.id,
        session.date.format(DATE_FORMAT)
    )?;
    Ok(())
}

fn display_or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

fn progress_bar(ratio: f64) -> String {
    let clamped = ratio.clamp(0.0, 100.0);
    let filled = (clamped / 100.0 * PROGRESS_BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

fn print_dashboard(
    dashboard: &Dashboard<'_>,
    options: &DashboardOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    let stats = &dashboard.statistics;
    writeln!(out, "Dashboard for {}", dashboard.month)?;
    writeln!(out, "  total sessions:       {}", stats.total_sessions)?;
    writeln!(out, "  distinct poses:       {}", stats.distinct_pose_count)?;
    match stats.average_satisfaction {
        Some(avg) => writeln!(out, "  average satisfaction: {avg:.1} / 5")?,
        None => writeln!(out, "  average satisfaction: no data")?,
    }
    writeln!(
        out,
        "  this month:           {} / {} {} {:.0}%",
        stats.sessions_this_month,
        options.monthly_goal,
        progress_bar(stats.monthly_progress_ratio),
        stats.monthly_progress_ratio.min(100.0)
    )?;

    if !dashboard.top_poses.is_empty() {
        writeln!(out, "Top poses:")?;
        for (rank, pose) in dashboard.top_poses.iter().enumerate() {
            writeln!(
                out,
                "  {:>2}. {} x{}  last {}  proficiency {}%",
                rank + 1,
                pose.name,
                pose.count,
                pose.last_practiced.format(DATE_FORMAT),
                pose.proficiency
            )?;
        }
    }

    if !dashboard.locations.is_empty() {
        writeln!(out, "Locations:")?;
        for group in &dashboard.locations {
            writeln!(
                out,
                "  {} ({})",
                display_or_dash(group.location),
                group.sessions.len()
            )?;
        }
    }
    Ok(())
}

fn print_calendar(
    sessions: &[yogalog::session::PracticeSession],
    month: YearMonth,
    out: &mut dyn Write,
) -> io::Result<()> {
    writeln!(out, "{month}")?;
    writeln!(out, " Su  Mo  Tu  We  Th  Fr  Sa")?;
    let view = month_view(sessions, month);
    for week in view.chunks(7) {
        let line: String = week
            .iter()
            .map(|slot| match slot {
                None => "    ".to_string(),
                Some(day) if day.sessions.is_empty() => format!("{:>3} ", day.date.day()),
                Some(day) => format!("{:>3}*", day.date.day()),
            })
            .collect();
        writeln!(out, "{}", line.trim_end())?;
    }
    let practiced = view.iter().flatten().filter(|d| !d.sessions.is_empty()).count();
    writeln!(out, "{practiced} practice days")?;
    Ok(())
}

fn run_poses(
    cmd: PosesCommand,
    store: &mut dyn PracticeStore,
    out: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    match cmd {
        PosesCommand::List { dosha, search } => {
            store.seed_default_poses_if_empty()?;
            let poses = store.list_poses()?;
            let matches = filter_poses(&poses, dosha, &search);
            if matches.is_empty() {
                writeln!(out, "no poses found")?;
            }
            for pose in matches {
                writeln!(
                    out,
                    "#{} {} ({}) [{}]{}",
                    pose.id,
                    pose.name,
                    pose.name_en,
                    pose.dosha,
                    if pose.is_custom { " custom" } else { "" }
                )?;
                writeln!(out, "    {}", pose.benefits.join(", "))?;
            }
        }
        PosesCommand::Add {
            name,
            name_en,
            description,
            dosha,
            benefits,
            image,
        } => {
            let pose = store.add_pose(NewPose {
                name,
                name_en,
                description,
                dosha,
                benefits,
                image_ref: image,
            })?;
            writeln!(out, "added pose #{} {}", pose.id, pose.name)?;
        }
        PosesCommand::Delete { id } => {
            if store.delete_pose(PoseId(id))? {
                writeln!(out, "deleted pose #{id}")?;
            } else {
                return Err(format!("no pose #{id}").into());
            }
        }
        PosesCommand::Seed => {
            let seeded = store.seed_default_poses_if_empty()?;
            writeln!(out, "seeded {seeded} poses")?;
        }
    }
    Ok(())
}

fn run_dosha(
    cmd: DoshaCommand,
    store: &mut dyn PracticeStore,
    out: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    let bank = QuestionBank::builtin()?;
    match cmd {
        DoshaCommand::Questions { dosha } => {
            for q in bank.questions() {
                if dosha.map_or(true, |d| q.category == d) {
                    writeln!(out, "{:>3}. [{}] {}", q.id, q.category, q.text)?;
                }
            }
        }
        DoshaCommand::Score { ids, json } => {
            let mut quiz = DoshaQuiz::new(&bank);
            for id in ids.into_iter().collect::<BTreeSet<_>>() {
                match quiz.toggle(id) {
                    Ok(_) => {}
                    Err(JournalError::UnknownQuestion(id)) => {
                        tracing::warn!("ignoring unknown question {id}")
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            let result = quiz.submit()?;
            if json {
                writeln!(out, "{}", serde_json::to_string(&result)?)?;
            } else {
                print_dosha_result(&result, store, out)?;
            }
        }
    }
    Ok(())
}

fn print_dosha_result(
    result: &DoshaResult,
    store: &mut dyn PracticeStore,
    out: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    for dosha in Dosha::ALL {
        writeln!(
            out,
            "{:<6} {:>2} ({:>3}%)",
            dosha.to_string(),
            result.count(dosha),
            result.share(dosha)
        )?;
    }
    writeln!(out, "dominant: {}", result.dominant)?;

    let profile = DoshaProfile::builtin(result.dominant)?;
    writeln!(out)?;
    writeln!(out, "{} - {}", profile.title, profile.subtitle)?;
    writeln!(out, "{}", profile.description)?;
    for tip in &profile.recommendations {
        writeln!(out, "  * {tip}")?;
    }

    store.seed_default_poses_if_empty()?;
    let poses = store.list_poses()?;
    let picks = recommended_poses(&poses, result);
    if !picks.is_empty() {
        writeln!(out, "Recommended poses:")?;
        for pose in picks {
            writeln!(out, "  {} ({})", pose.name, pose.name_en)?;
        }
    }
    Ok(())
}
