use crate::data::{read_bundled, DEFAULT_POSES_FILE};
use crate::dosha::{Dosha, DoshaResult};
use crate::error::{JournalError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_BENEFIT: &str = "General wellbeing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoseId(pub i64);

impl fmt::Display for PoseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A catalog entry, either seeded from the defaults or added by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct YogaPose {
    pub id: PoseId,
    pub name: String,
    pub name_en: String,
    pub description: String,
    pub dosha: Dosha,
    pub benefits: Vec<String>,
    pub image_ref: Option<String>,
    pub is_custom: bool,
    pub created_at: DateTime<Utc>,
}

/// Stored form of a pose. Fields are kept loose and checked by
/// [`YogaPose::from_document`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseDocument {
    pub name: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub description: String,
    pub dosha_type: String,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl YogaPose {
    /// Decode a stored document. A missing or unreadable creation time is
    /// replaced with `fallback_created_at`.
    pub fn from_document(
        id: PoseId,
        doc: PoseDocument,
        fallback_created_at: DateTime<Utc>,
    ) -> Result<Self> {
        let invalid = |reason: String| JournalError::InvalidDocument { id: id.0, reason };

        if doc.name.trim().is_empty() {
            return Err(invalid("pose has no name".to_string()));
        }
        let dosha = Dosha::parse(&doc.dosha_type)
            .ok_or_else(|| invalid(format!("unknown dosha {:?}", doc.dosha_type)))?;
        let created_at = doc
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(fallback_created_at);

        Ok(Self {
            id,
            name: doc.name,
            name_en: doc.name_en,
            description: doc.description,
            dosha,
            benefits: doc.benefits,
            image_ref: doc.image_url,
            is_custom: doc.is_custom,
            created_at,
        })
    }

    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.name_en.to_lowercase().contains(&query)
    }
}

/// Input for adding a pose to the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPose {
    pub name: String,
    pub name_en: String,
    pub description: String,
    pub dosha: Dosha,
    pub benefits: Vec<String>,
    pub image_ref: Option<String>,
}

impl NewPose {
    /// Trim fields, drop blank benefits and make sure at least one remains.
    pub fn normalize(self) -> Result<Self> {
        let name = self.name.trim().to_string();
        let description = self.description.trim().to_string();
        if name.is_empty() {
            return Err(JournalError::InvalidPose("name is required".to_string()));
        }
        if description.is_empty() {
            return Err(JournalError::InvalidPose("description is required".to_string()));
        }

        let mut benefits: Vec<String> = self
            .benefits
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
            .map(str::to_string)
            .collect();
        if benefits.is_empty() {
            benefits.push(DEFAULT_BENEFIT.to_string());
        }

        Ok(Self {
            name,
            name_en: self.name_en.trim().to_string(),
            description,
            dosha: self.dosha,
            benefits,
            image_ref: self.image_ref.filter(|r| !r.trim().is_empty()),
        })
    }

    pub fn to_document(&self, is_custom: bool, created_at: DateTime<Utc>) -> PoseDocument {
        PoseDocument {
            name: self.name.clone(),
            name_en: self.name_en.clone(),
            description: self.description.clone(),
            dosha_type: self.dosha.to_string(),
            benefits: self.benefits.clone(),
            image_url: self.image_ref.clone(),
            is_custom,
            created_at: Some(created_at.to_rfc3339()),
        }
    }
}

/// The catalog seeded into an empty store.
pub fn default_poses() -> Result<Vec<NewPose>> {
    let docs: Vec<PoseDocument> = read_bundled(DEFAULT_POSES_FILE)?;
    docs.into_iter()
        .map(|doc| {
            let dosha = Dosha::parse(&doc.dosha_type).ok_or_else(|| {
                JournalError::MissingData(format!("default pose {:?} has no dosha", doc.name))
            })?;
            NewPose {
                name: doc.name,
                name_en: doc.name_en,
                description: doc.description,
                dosha,
                benefits: doc.benefits,
                image_ref: doc.image_url,
            }
            .normalize()
        })
        .collect()
}

/// Poses of one dosha (or all), narrowed by a case-insensitive search on
/// either name.
pub fn filter_poses<'a>(
    poses: &'a [YogaPose],
    dosha: Option<Dosha>,
    query: &str,
) -> Vec<&'a YogaPose> {
    poses
        .iter()
        .filter(|p| dosha.map_or(true, |d| p.dosha == d))
        .filter(|p| p.matches_query(query))
        .collect()
}

pub fn recommended_poses<'a>(poses: &'a [YogaPose], result: &DoshaResult) -> Vec<&'a YogaPose> {
    filter_poses(poses, Some(result.dominant), "")
}
