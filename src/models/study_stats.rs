//! Derived progress records. Never persisted, recomputed from sessions on demand.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StudyStats {
    pub total_cards: u64,
    pub mastered_cards: u64,
    pub cards_to_review: u64,
    pub study_streak: u32,
    pub last_study_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    pub study_streak: u32,
    pub mastered_cards: u64,
    /// Ratio of correct to studied cards, 0.0 when nothing was studied
    pub accuracy: f64,
}
