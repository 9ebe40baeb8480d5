use crate::error::{JournalError, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(pub i64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Self-reported satisfaction, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Satisfaction(u8);

impl Satisfaction {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then_some(Self(value))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Satisfaction {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

impl TryFrom<i64> for Satisfaction {
    type Error = JournalError;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .and_then(Satisfaction::new)
            .ok_or_else(|| {
                JournalError::InvalidSession(format!(
                    "satisfaction {value} outside {}..={}",
                    Self::MIN,
                    Self::MAX
                ))
            })
    }
}

/// A saved practice session. Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeSession {
    pub id: SessionId,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub instructor: String,
    pub poses: Vec<String>,
    pub style: String,
    pub reflection: String,
    pub notes: String,
    pub satisfaction: Satisfaction,
    pub media_refs: Vec<String>,
}

/// Loosely typed body of a session as stored in the document store.
///
/// Nothing here is trusted; [`PracticeSession::from_document`] is the only
/// way into the typed core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub poses: Vec<String>,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub reflection: String,
    #[serde(default)]
    pub notes: String,
    pub satisfaction: i64,
    #[serde(default)]
    pub media_refs: Vec<String>,
}

impl PracticeSession {
    pub fn from_document(id: SessionId, doc: SessionDocument) -> Result<Self> {
        let invalid = |reason: String| JournalError::InvalidDocument { id: id.0, reason };

        let date = NaiveDate::parse_from_str(doc.date.trim(), DATE_FORMAT)
            .map_err(|e| invalid(format!("date {:?}: {e}", doc.date)))?;
        let time = NaiveTime::parse_from_str(doc.time.trim(), TIME_FORMAT)
            .map_err(|e| invalid(format!("time {:?}: {e}", doc.time)))?;
        let satisfaction =
            Satisfaction::try_from(doc.satisfaction).map_err(|e| invalid(e.to_string()))?;

        {
            let mut seen = HashSet::new();
            if let Some(dup) = doc.poses.iter().find(|p| !seen.insert(p.as_str())) {
                return Err(invalid(format!("pose {dup:?} listed twice")));
            }
        }

        Ok(Self {
            id,
            date,
            time,
            location: doc.location,
            instructor: doc.instructor,
            poses: doc.poses,
            style: doc.style,
            reflection: doc.reflection,
            notes: doc.notes,
            satisfaction,
            media_refs: doc.media_refs,
        })
    }

    pub fn to_document(&self) -> SessionDocument {
        SessionDocument {
            date: self.date.format(DATE_FORMAT).to_string(),
            time: self.time.format(TIME_FORMAT).to_string(),
            location: self.location.clone(),
            instructor: self.instructor.clone(),
            poses: self.poses.clone(),
            style: self.style.clone(),
            reflection: self.reflection.clone(),
            notes: self.notes.clone(),
            satisfaction: i64::from(self.satisfaction.get()),
            media_refs: self.media_refs.clone(),
        }
    }
}

/// Journal-entry form state. Owned by whoever is filling in the entry and
/// discarded once saved.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDraft {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location: String,
    pub instructor: String,
    pub poses: Vec<String>,
    pub style: String,
    pub reflection: String,
    pub notes: String,
    pub satisfaction: u8,
    pub media_refs: Vec<String>,
}

impl Default for SessionDraft {
    fn default() -> Self {
        let now = Local::now().naive_local();
        Self::new(now.date(), now.time())
    }
}

impl SessionDraft {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            date,
            time,
            location: String::new(),
            instructor: String::new(),
            poses: Vec::new(),
            style: String::new(),
            reflection: String::new(),
            notes: String::new(),
            satisfaction: Satisfaction::default().get(),
            media_refs: Vec::new(),
        }
    }

    /// Add a pose tag. Returns false for blank or already-listed names.
    pub fn add_pose(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.poses.iter().any(|p| p == name) {
            return false;
        }
        self.poses.push(name.to_string());
        true
    }

    pub fn remove_pose(&mut self, name: &str) -> bool {
        let before = self.poses.len();
        self.poses.retain(|p| p != name);
        self.poses.len() != before
    }

    pub fn add_media(&mut self, reference: impl Into<String>) {
        self.media_refs.push(reference.into());
    }

    pub fn remove_media(&mut self, index: usize) -> Option<String> {
        (index < self.media_refs.len()).then(|| self.media_refs.remove(index))
    }

    /// Validate the draft and produce the document to persist.
    pub fn build(&self) -> Result<SessionDocument> {
        Satisfaction::new(self.satisfaction).ok_or_else(|| {
            JournalError::InvalidSession(format!(
                "satisfaction {} outside {}..={}",
                self.satisfaction,
                Satisfaction::MIN,
                Satisfaction::MAX
            ))
        })?;

        Ok(SessionDocument {
            date: self.date.format(DATE_FORMAT).to_string(),
            time: self.time.format(TIME_FORMAT).to_string(),
            location: self.location.trim().to_string(),
            instructor: self.instructor.trim().to_string(),
            poses: self.poses.clone(),
            style: self.style.trim().to_string(),
            reflection: self.reflection.clone(),
            notes: self.notes.clone(),
            satisfaction: i64::from(self.satisfaction),
            media_refs: self.media_refs.clone(),
        })
    }
}
