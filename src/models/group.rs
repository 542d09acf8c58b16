//! Group is a named, colored collection of flashcards owned by one user
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupColor {
    #[default]
    Blue,
    Green,
    Purple,
    Pink,
    Yellow,
    Orange,
}

impl GroupColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupColor::Blue => "blue",
            GroupColor::Green => "green",
            GroupColor::Purple => "purple",
            GroupColor::Pink => "pink",
            GroupColor::Yellow => "yellow",
            GroupColor::Orange => "orange",
        }
    }
}

impl fmt::Display for GroupColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blue" => Ok(GroupColor::Blue),
            "green" => Ok(GroupColor::Green),
            "purple" => Ok(GroupColor::Purple),
            "pink" => Ok(GroupColor::Pink),
            "yellow" => Ok(GroupColor::Yellow),
            "orange" => Ok(GroupColor::Orange),
            other => Err(format!("unknown color '{}'", other)),
        }
    }
}

/// `card_count` is computed by the store on read and never written back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlashcardGroup {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub color: GroupColor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub card_count: usize,
}

#[derive(Clone, Debug, Default)]
pub struct NewGroup {
    pub name: String,
    pub description: String,
    pub color: GroupColor,
}

#[derive(Clone, Debug, Default)]
pub struct GroupChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<GroupColor>,
}
