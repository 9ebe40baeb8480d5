use crate::error::{JournalError, Result};
use include_dir::{include_dir, Dir};
use serde::de::DeserializeOwned;

static DATA_DIR: Dir = include_dir!("src/data");

pub const QUESTION_BANK_FILE: &str = "dosha_questions.json";
pub const DOSHA_PROFILES_FILE: &str = "dosha_profiles.json";
pub const DEFAULT_POSES_FILE: &str = "default_poses.json";

/// Deserialize one of the JSON files bundled into the binary.
pub fn read_bundled<T: DeserializeOwned>(file_name: &str) -> Result<T> {
    let file = DATA_DIR
        .get_file(file_name)
        .ok_or_else(|| JournalError::MissingData(file_name.to_string()))?;

    let contents = file
        .contents_utf8()
        .ok_or_else(|| JournalError::MissingData(format!("{file_name} is not utf-8")))?;

    Ok(serde_json::from_str(contents)?)
}
