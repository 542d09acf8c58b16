//! One bounded study attempt and the counts it produced.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which cards a session covered: one group, or every group of the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupScope {
    All,
    Group(i64),
}

impl GroupScope {
    pub fn from_group(group_id: Option<i64>) -> Self {
        match group_id {
            Some(id) => GroupScope::Group(id),
            None => GroupScope::All,
        }
    }

    pub fn group_id(&self) -> Option<i64> {
        match self {
            GroupScope::All => None,
            GroupScope::Group(id) => Some(*id),
        }
    }
}

impl fmt::Display for GroupScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupScope::All => f.write_str("all"),
            GroupScope::Group(id) => write!(f, "{}", id),
        }
    }
}

/// Created with zero counts and no end time; `end_time` is written once when
/// the session is finalized. `user_name` is joined from the user's profile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: i64,
    pub user_id: String,
    pub user_name: Option<String>,
    pub scope: GroupScope,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub cards_studied: u32,
    pub cards_correct: u32,
}

impl StudySession {
    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct NewStudySession {
    pub user_id: String,
    pub scope: GroupScope,
    pub start_time: DateTime<Utc>,
}

/// Values written when a session is finalized.
#[derive(Clone, Debug)]
pub struct SessionResult {
    pub cards_studied: u32,
    pub cards_correct: u32,
    pub end_time: DateTime<Utc>,
}
