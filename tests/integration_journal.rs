use chrono::NaiveDate;
use std::collections::BTreeSet;
use yogalog::catalog::{filter_poses, recommended_poses};
use yogalog::dashboard::{self, Dashboard, DashboardOptions, YearMonth};
use yogalog::dosha::{score, Dosha, QuestionBank};
use yogalog::quiz::{DoshaQuiz, QuizPhase};
use yogalog::session::SessionDraft;
use yogalog::store::{JournalDb, OfflineStore, PracticeStore};

fn draft(date: &str, time: &str, location: &str, poses: &[&str], satisfaction: u8) -> SessionDraft {
    let mut draft = SessionDraft::new(
        NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        chrono::NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
    );
    draft.location = location.to_string();
    draft.instructor = "Mina".to_string();
    draft.style = "Vinyasa".to_string();
    draft.satisfaction = satisfaction;
    for pose in poses {
        draft.add_pose(pose);
    }
    draft
}

/// Sessions saved through the store come back in order and feed the
/// dashboard exactly as in-memory ones would.
#[test]
fn journal_to_dashboard_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("journal.db");
    let mut db = JournalDb::open(&path).unwrap();

    let entries = [
        draft("2025-11-05", "10:00", "Gangnam", &["Down Dog", "Plank", "Warrior I", "Warrior II"], 5),
        draft("2025-11-03", "19:00", "Hongdae", &["Child", "Pigeon", "Cobra"], 4),
        draft("2025-11-01", "07:00", "Gangnam", &["Plank", "Chaturanga", "Down Dog", "Up Dog"], 4),
        draft("2025-10-28", "07:00", "Hongdae", &["Cobra"], 3),
    ];
    for entry in &entries {
        db.add_session(&entry.build().unwrap()).unwrap();
    }
    drop(db);

    let db = JournalDb::open(&path).unwrap();
    let sessions = db.list_sessions().unwrap();
    assert_eq!(sessions.len(), 4);

    let november = YearMonth::new(2025, 11).unwrap();
    let board = Dashboard::build(&sessions, november, &DashboardOptions::default());

    assert_eq!(board.statistics.total_sessions, 4);
    assert_eq!(board.statistics.distinct_pose_count, 9);
    assert_eq!(board.statistics.average_satisfaction, Some(4.0));
    assert_eq!(board.statistics.sessions_this_month, 3);
    assert_eq!(board.statistics.monthly_progress_ratio, 25.0);

    let names: Vec<_> = board.top_poses.iter().take(3).map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Down Dog", "Plank", "Cobra"]);
    assert_eq!(
        board.top_poses[2].last_practiced,
        NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
    );

    let locations: Vec<_> = board.locations.iter().map(|g| (g.location, g.sessions.len())).collect();
    assert_eq!(locations, vec![("Gangnam", 2), ("Hongdae", 2)]);

    let grid = dashboard::calendar_grid(november);
    assert_eq!(grid.len(), 36);

    // previous month only sees the October session
    let october = november.prev();
    assert_eq!(dashboard::statistics(&sessions, october).sessions_this_month, 1);
}

#[test]
fn quiz_result_drives_pose_recommendations() {
    let bank = QuestionBank::builtin().unwrap();
    let mut quiz = DoshaQuiz::new(&bank);

    let pitta: Vec<u32> = bank.by_dosha(Dosha::Pitta).take(5).map(|q| q.id).collect();
    let vata: Vec<u32> = bank.by_dosha(Dosha::Vata).take(3).map(|q| q.id).collect();
    let kapha: Vec<u32> = bank.by_dosha(Dosha::Kapha).take(2).map(|q| q.id).collect();
    for id in pitta.iter().chain(&vata).chain(&kapha) {
        quiz.toggle(*id).unwrap();
    }
    assert_eq!(quiz.phase(), QuizPhase::InProgress);
    assert_eq!(quiz.progress(), (10, 90));

    let result = quiz.submit().unwrap();
    assert_eq!((result.vata, result.pitta, result.kapha), (3, 5, 2));
    assert_eq!(result.dominant, Dosha::Pitta);

    // the scorer alone agrees with the quiz snapshot
    let affirmed: BTreeSet<u32> = quiz.selected().clone();
    assert_eq!(score(&bank, &affirmed), result);

    let mut db = JournalDb::open_in_memory().unwrap();
    db.seed_default_poses_if_empty().unwrap();
    let poses = db.list_poses().unwrap();
    let picks = recommended_poses(&poses, &result);
    assert!(!picks.is_empty());
    assert!(picks.iter().all(|p| p.dosha == Dosha::Pitta));
    assert_eq!(picks.len(), filter_poses(&poses, Some(Dosha::Pitta), "").len());

    quiz.restart();
    assert_eq!(quiz.phase(), QuizPhase::Idle);
}

#[test]
fn offline_store_still_serves_dashboard_and_catalog() {
    let store = OfflineStore::new();
    let sessions = store.list_sessions().unwrap();
    let stats = dashboard::statistics(&sessions, YearMonth::new(2025, 11).unwrap());
    assert_eq!(stats.total_sessions, 0);
    assert_eq!(stats.average_satisfaction, None);

    let poses = store.list_poses().unwrap();
    for dosha in Dosha::ALL {
        assert!(!filter_poses(&poses, Some(dosha), "").is_empty());
    }
}
