use crate::data::{read_bundled, DOSHA_PROFILES_FILE, QUESTION_BANK_FILE};
use crate::error::{JournalError, Result};
use crate::util::round_to;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Dosha {
    Vata,
    Pitta,
    Kapha,
}

impl Dosha {
    pub const ALL: [Dosha; 3] = [Dosha::Vata, Dosha::Pitta, Dosha::Kapha];

    /// Parse the lowercase stored name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.to_string() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoshaQuestion {
    pub id: u32,
    pub text: String,
    #[serde(rename = "type")]
    pub category: Dosha,
}

/// The fixed questionnaire shipped with the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    pub version: u32,
    questions: Vec<DoshaQuestion>,
}

impl QuestionBank {
    pub fn new(version: u32, questions: Vec<DoshaQuestion>) -> Self {
        Self { version, questions }
    }

    pub fn builtin() -> Result<Self> {
        read_bundled(QUESTION_BANK_FILE)
    }

    pub fn questions(&self) -> &[DoshaQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&DoshaQuestion> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn category_of(&self, id: u32) -> Option<Dosha> {
        self.get(id).map(|q| q.category)
    }

    pub fn by_dosha(&self, dosha: Dosha) -> impl Iterator<Item = &DoshaQuestion> + '_ {
        self.questions.iter().filter(move |q| q.category == dosha)
    }
}

/// Per-dosha counts plus the dominant dosha. This is what the result view
/// receives once the quiz is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoshaResult {
    pub vata: u32,
    pub pitta: u32,
    pub kapha: u32,
    pub dominant: Dosha,
}

impl DoshaResult {
    pub fn from_counts(vata: u32, pitta: u32, kapha: u32) -> Self {
        Self {
            vata,
            pitta,
            kapha,
            dominant: dominant(vata, pitta, kapha),
        }
    }

    pub fn count(&self, dosha: Dosha) -> u32 {
        match dosha {
            Dosha::Vata => self.vata,
            Dosha::Pitta => self.pitta,
            Dosha::Kapha => self.kapha,
        }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.vata) + u64::from(self.pitta) + u64::from(self.kapha)
    }

    /// Whole-number percentage of all affirmed answers; 0 when nothing was
    /// affirmed.
    pub fn share(&self, dosha: Dosha) -> u32 {
        match self.total() {
            0 => 0,
            total => round_to(f64::from(self.count(dosha)) / total as f64 * 100.0, 0) as u32,
        }
    }
}

/// Pitta wins only when strictly ahead of both others, then kapha likewise;
/// every other case, ties included, falls back to vata.
pub fn dominant(vata: u32, pitta: u32, kapha: u32) -> Dosha {
    if pitta > vata && pitta > kapha {
        Dosha::Pitta
    } else if kapha > vata && kapha > pitta {
        Dosha::Kapha
    } else {
        Dosha::Vata
    }
}

/// Tally affirmed question ids by category. Ids missing from the bank are
/// ignored.
pub fn score(bank: &QuestionBank, affirmed: &BTreeSet<u32>) -> DoshaResult {
    let (mut vata, mut pitta, mut kapha) = (0, 0, 0);
    for category in affirmed.iter().filter_map(|&id| bank.category_of(id)) {
        match category {
            Dosha::Vata => vata += 1,
            Dosha::Pitta => pitta += 1,
            Dosha::Kapha => kapha += 1,
        }
    }
    DoshaResult::from_counts(vata, pitta, kapha)
}

/// Descriptive texts shown alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DoshaProfile {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub characteristics: Vec<String>,
    pub recommendations: Vec<String>,
}

impl DoshaProfile {
    pub fn builtin(dosha: Dosha) -> Result<Self> {
        let mut profiles: HashMap<Dosha, DoshaProfile> = read_bundled(DOSHA_PROFILES_FILE)?;
        profiles
            .remove(&dosha)
            .ok_or_else(|| JournalError::MissingData(format!("profile for {dosha}")))
    }
}
