//! Flashcard is a pair <front, back> with a difficulty tag and review timestamps.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: i64,
    pub group_id: i64,
    pub front: String,
    pub back: String,
    pub difficulty: Difficulty,
    pub last_reviewed: Option<DateTime<Utc>>,
    pub next_review_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Flashcard {
    /// A card never reviewed is always due.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review_date {
            Some(next) => next <= now,
            None => true,
        }
    }
}

/// Fields supplied when creating a flashcard.
#[derive(Clone, Debug)]
pub struct NewFlashcard {
    pub group_id: i64,
    pub front: String,
    pub back: String,
    pub difficulty: Difficulty,
}

/// Card text without a group, used when a whole group is created at once.
#[derive(Clone, Debug)]
pub struct CardContent {
    pub front: String,
    pub back: String,
    pub difficulty: Difficulty,
}

/// Partial edit of a flashcard's content. `None` leaves the field untouched.
/// Review dates are only written through a review.
#[derive(Clone, Debug, Default)]
pub struct FlashcardChanges {
    pub front: Option<String>,
    pub back: Option<String>,
    pub difficulty: Option<Difficulty>,
}
