use thiserror::Error;

/// Errors surfaced by the journal library and its persistence adapter.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid document {id}: {reason}")]
    InvalidDocument { id: i64, reason: String },
    #[error("invalid session: {0}")]
    InvalidSession(String),
    #[error("invalid pose: {0}")]
    InvalidPose(String),
    #[error("journal store is not configured")]
    NotConfigured,
    #[error("unknown question id {0}")]
    UnknownQuestion(u32),
    #[error("at least one question must be selected before submitting")]
    EmptySubmission,
    #[error("quiz already submitted; restart to change answers")]
    QuizComplete,
    #[error("bundled data missing: {0}")]
    MissingData(String),
}

pub type Result<T> = std::result::Result<T, JournalError>;
