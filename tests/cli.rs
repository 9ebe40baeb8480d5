// Drives the compiled binary against a throwaway database.

use assert_cmd::Command;
use tempfile::TempDir;

fn yogalog(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("yogalog").unwrap();
    cmd.arg("--db")
        .arg(dir.path().join("journal.db"))
        .arg("--config")
        .arg(dir.path().join("config.json"))
        .env_remove("RUST_LOG")
        .env_remove("YOGALOG_LOG");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn log_sessions_and_view_stats() {
    let dir = tempfile::tempdir().unwrap();

    let out = stdout_of(yogalog(&dir).args([
        "log", "--date", "2025-11-05", "--time", "10:00", "--location", "Gangnam", "--pose",
        "Plank", "--pose", "Cobra", "--satisfaction", "5",
    ]));
    assert!(out.contains("recorded session #1"));

    stdout_of(yogalog(&dir).args([
        "log", "--date", "2025-11-03", "--time", "19:00", "--location", "Hongdae", "--pose",
        "Plank", "--satisfaction", "4",
    ]));

    let out = stdout_of(yogalog(&dir).args(["stats", "--month", "2025-11"]));
    assert!(out.contains("total sessions:       2"));
    assert!(out.contains("average satisfaction: 4.5 / 5"));
    assert!(out.contains("Plank x2"));

    let out = stdout_of(yogalog(&dir).args(["sessions", "--by-location", "Hongdae"]));
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("2025-11-03 19:00 Hongdae"));
}

#[test]
fn config_goal_changes_progress() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.json"), r#"{"monthly_goal": 2}"#).unwrap();

    stdout_of(yogalog(&dir).args(["log", "--date", "2025-11-05", "--time", "10:00"]));
    let out = stdout_of(yogalog(&dir).args(["stats", "--month", "2025-11"]));
    assert!(out.contains("this month:           1 / 2"));
    assert!(out.contains("50%"));
}

#[test]
fn invalid_satisfaction_fails() {
    let dir = tempfile::tempdir().unwrap();
    yogalog(&dir)
        .args(["log", "--satisfaction", "0"])
        .assert()
        .failure();
}

#[test]
fn export_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    stdout_of(yogalog(&dir).args(["log", "--date", "2025-11-05", "--time", "10:00", "--pose", "Tree"]));

    let csv_path = dir.path().join("sessions.csv");
    let out = stdout_of(yogalog(&dir).arg("export").arg(&csv_path));
    assert!(out.contains("exported 1 sessions"));

    let csv = std::fs::read_to_string(csv_path).unwrap();
    assert!(csv.starts_with("id,date,time"));
    assert!(csv.contains("2025-11-05,10:00"));
}

#[test]
fn dosha_questions_and_json_score() {
    let dir = tempfile::tempdir().unwrap();

    let out = stdout_of(yogalog(&dir).args(["dosha", "questions", "--dosha", "kapha"]));
    assert_eq!(out.lines().count(), 30);
    assert!(out.lines().all(|l| l.contains("[kapha]")));

    let out = stdout_of(yogalog(&dir).args(["dosha", "score", "--json", "1", "31", "61"]));
    let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(value["vata"], 1);
    assert_eq!(value["pitta"], 1);
    assert_eq!(value["kapha"], 1);
    assert_eq!(value["dominant"], "vata");
}

#[test]
fn empty_dosha_submission_fails() {
    let dir = tempfile::tempdir().unwrap();
    yogalog(&dir)
        .args(["dosha", "score", "1000"])
        .assert()
        .failure();
}

#[test]
fn unusable_database_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    // a directory where the database file should be cannot be opened
    std::fs::create_dir(dir.path().join("journal.db")).unwrap();

    let out = stdout_of(yogalog(&dir).args(["poses", "list"]));
    assert!(out.contains("Vrksasana"));

    yogalog(&dir)
        .args(["log", "--date", "2025-11-05", "--time", "10:00"])
        .assert()
        .failure();
}
