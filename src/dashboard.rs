//! Practice-log aggregation behind the dashboard: headline statistics,
//! per-pose progress, grouping by location and the month calendar.
//!
//! Every function here is a pure pass over a caller-owned slice of sessions.

use crate::config::Config;
use crate::error::{JournalError, Result};
use crate::session::PracticeSession;
use crate::util::{mean, round_to};
use chrono::{Datelike, Months, NaiveDate, Weekday};
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

pub const MONTHLY_GOAL: u32 = 12;
pub const TOP_POSE_LIMIT: usize = 10;

const PROFICIENCY_FLOOR: u32 = 60;
const PROFICIENCY_STEP: u32 = 4;

/// A calendar month, the unit the dashboard is viewed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map_or(*self, |first| Self { first })
    }

    pub fn prev(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map_or(*self, |first| Self { first })
    }

    pub fn days_in_month(&self) -> u32 {
        (self.next().first - self.first).num_days() as u32
    }

    pub fn first_weekday(&self) -> Weekday {
        self.first.weekday()
    }

    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || JournalError::InvalidSession(format!("month {s:?} is not YYYY-MM"));
        let (year, month) = s.trim().split_once('-').ok_or_else(bad)?;
        let year = year.parse::<i32>().map_err(|_| bad())?;
        let month = month.parse::<u32>().map_err(|_| bad())?;
        YearMonth::new(year, month).ok_or_else(bad)
    }
}

/// Tunables for the dashboard, normally taken from [`Config`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardOptions {
    pub monthly_goal: u32,
    pub top_pose_limit: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            monthly_goal: MONTHLY_GOAL,
            top_pose_limit: TOP_POSE_LIMIT,
        }
    }
}

impl From<&Config> for DashboardOptions {
    fn from(cfg: &Config) -> Self {
        Self {
            monthly_goal: cfg.monthly_goal,
            top_pose_limit: cfg.top_pose_limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub total_sessions: usize,
    pub distinct_pose_count: usize,
    /// `None` when there are no sessions to average.
    pub average_satisfaction: Option<f64>,
    pub sessions_this_month: usize,
    /// Percentage of the monthly goal reached; may exceed 100.
    pub monthly_progress_ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoseProgress {
    pub name: String,
    pub count: usize,
    pub last_practiced: NaiveDate,
    pub proficiency: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationGroup<'a> {
    pub location: &'a str,
    pub sessions: Vec<&'a PracticeSession>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub sessions: Vec<&'a PracticeSession>,
}

pub fn statistics(sessions: &[PracticeSession], month: YearMonth) -> Statistics {
    statistics_with(sessions, month, &DashboardOptions::default())
}

pub fn statistics_with(
    sessions: &[PracticeSession],
    month: YearMonth,
    options: &DashboardOptions,
) -> Statistics {
    let distinct_pose_count = sessions
        .iter()
        .flat_map(|s| s.poses.iter().map(String::as_str))
        .collect::<HashSet<_>>()
        .len();

    let satisfaction = sessions
        .iter()
        .map(|s| f64::from(s.satisfaction.get()))
        .collect::<Vec<_>>();
    let average_satisfaction = mean(&satisfaction).map(|avg| round_to(avg, 1));

    let sessions_this_month = sessions.iter().filter(|s| month.contains(s.date)).count();
    let monthly_progress_ratio = match options.monthly_goal {
        0 => 0.0,
        goal => sessions_this_month as f64 / f64::from(goal) * 100.0,
    };

    Statistics {
        total_sessions: sessions.len(),
        distinct_pose_count,
        average_satisfaction,
        sessions_this_month,
        monthly_progress_ratio,
    }
}

/// Deterministic stand-in for pose mastery: starts at 60 and climbs with
/// every repeat until it caps at 100.
pub fn proficiency(count: usize) -> u8 {
    let repeats = u32::try_from(count.saturating_sub(1)).unwrap_or(u32::MAX);
    let score = PROFICIENCY_FLOOR.saturating_add(repeats.saturating_mul(PROFICIENCY_STEP));
    score.min(100) as u8
}

/// Most practiced poses, highest count first. Ties keep the order in which
/// the poses were first seen.
pub fn top_poses(sessions: &[PracticeSession], limit: usize) -> Vec<PoseProgress> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut progress: Vec<PoseProgress> = Vec::new();

    for session in sessions {
        for pose in &session.poses {
            match index.get(pose.as_str()) {
                Some(&i) => {
                    let entry = &mut progress[i];
                    entry.count += 1;
                    if session.date > entry.last_practiced {
                        entry.last_practiced = session.date;
                    }
                }
                None => {
                    index.insert(pose.as_str(), progress.len());
                    progress.push(PoseProgress {
                        name: pose.clone(),
                        count: 1,
                        last_practiced: session.date,
                        proficiency: 0,
                    });
                }
            }
        }
    }

    progress
        .into_iter()
        .sorted_by(|a, b| b.count.cmp(&a.count))
        .take(limit)
        .map(|p| PoseProgress {
            proficiency: proficiency(p.count),
            ..p
        })
        .collect()
}

/// Sessions grouped by location, locations in order of first appearance.
pub fn sessions_by_location(sessions: &[PracticeSession]) -> Vec<LocationGroup<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<LocationGroup<'_>> = Vec::new();

    for session in sessions {
        let location = session.location.as_str();
        match index.get(location) {
            Some(&i) => groups[i].sessions.push(session),
            None => {
                index.insert(location, groups.len());
                groups.push(LocationGroup {
                    location,
                    sessions: vec![session],
                });
            }
        }
    }

    groups
}

/// Day slots for a month grid starting on Sunday: one `None` per leading
/// blank, then each day number. No trailing padding.
pub fn calendar_grid(month: YearMonth) -> Vec<Option<u32>> {
    let leading = month.first_weekday().num_days_from_sunday() as usize;
    std::iter::repeat(None)
        .take(leading)
        .chain((1..=month.days_in_month()).map(Some))
        .collect()
}

pub fn sessions_on(sessions: &[PracticeSession], date: NaiveDate) -> Vec<&PracticeSession> {
    sessions.iter().filter(|s| s.date == date).collect()
}

/// The calendar grid with each day's sessions attached.
pub fn month_view(sessions: &[PracticeSession], month: YearMonth) -> Vec<Option<CalendarDay<'_>>> {
    calendar_grid(month)
        .into_iter()
        .map(|slot| {
            slot.and_then(|day| month.day(day)).map(|date| CalendarDay {
                date,
                sessions: sessions_on(sessions, date),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionFilter {
    #[default]
    All,
    Location(String),
    Instructor(String),
    Style(String),
}

impl SessionFilter {
    pub fn matches(&self, session: &PracticeSession) -> bool {
        match self {
            SessionFilter::All => true,
            SessionFilter::Location(v) => &session.location == v,
            SessionFilter::Instructor(v) => &session.instructor == v,
            SessionFilter::Style(v) => &session.style == v,
        }
    }

    pub fn apply(&self, sessions: &[PracticeSession]) -> Vec<PracticeSession> {
        sessions
            .iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect()
    }
}

/// Everything the dashboard shows for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard<'a> {
    pub month: YearMonth,
    pub statistics: Statistics,
    pub top_poses: Vec<PoseProgress>,
    pub locations: Vec<LocationGroup<'a>>,
}

impl<'a> Dashboard<'a> {
    pub fn build(
        sessions: &'a [PracticeSession],
        month: YearMonth,
        options: &DashboardOptions,
    ) -> Self {
        Self {
            month,
            statistics: statistics_with(sessions, month, options),
            top_poses: top_poses(sessions, options.top_pose_limit),
            locations: sessions_by_location(sessions),
        }
    }
}
