//! Data-access seam between the study services and persistent storage.
//!
//! Every write returns the authoritative record as stored, so callers never
//! need to patch their own copies. Filters are exact-match only; `None`
//! fields do not constrain the query.

pub mod db;

use crate::error::Result;
use crate::models::{
    CardContent, Flashcard, FlashcardChanges, FlashcardGroup, GroupChanges, GroupScope,
    NewFlashcard, NewGroup, NewStudySession, SessionResult, StudySession, User,
};
use chrono::{DateTime, Utc};

pub use db::SqliteStore;

#[derive(Clone, Debug, Default)]
pub struct GroupFilter {
    pub id: Option<i64>,
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct CardFilter {
    pub id: Option<i64>,
    pub group_id: Option<i64>,
    /// Owner of the card's group
    pub user_id: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SessionFilter {
    pub id: Option<i64>,
    pub user_id: Option<String>,
    pub scope: Option<GroupScope>,
}

pub trait StudyStore {
    /// Creates or renames the profile that session listings join against.
    fn upsert_user(&self, user: &User) -> Result<()>;

    fn insert_group(&self, user_id: &str, group: &NewGroup, now: DateTime<Utc>)
    -> Result<FlashcardGroup>;
    /// Creates a group and its cards atomically: either all rows are
    /// written or none.
    fn import_group(
        &self,
        user_id: &str,
        group: &NewGroup,
        cards: &[CardContent],
        now: DateTime<Utc>,
    ) -> Result<FlashcardGroup>;
    /// Newest `updated_at` first.
    fn find_groups(&self, filter: &GroupFilter) -> Result<Vec<FlashcardGroup>>;
    fn update_group(
        &self,
        id: i64,
        changes: &GroupChanges,
        now: DateTime<Utc>,
    ) -> Result<FlashcardGroup>;
    /// Removes the group together with its cards.
    fn delete_group(&self, id: i64) -> Result<()>;

    fn insert_card(&self, card: &NewFlashcard, now: DateTime<Utc>) -> Result<Flashcard>;
    /// Newest cards first.
    fn find_cards(&self, filter: &CardFilter) -> Result<Vec<Flashcard>>;
    fn update_card(&self, id: i64, changes: &FlashcardChanges) -> Result<Flashcard>;
    /// Writes both review timestamps of a card in one statement.
    fn record_review(
        &self,
        id: i64,
        last_reviewed: DateTime<Utc>,
        next_review_date: DateTime<Utc>,
    ) -> Result<Flashcard>;
    fn delete_card(&self, id: i64) -> Result<()>;

    fn insert_session(&self, session: &NewStudySession) -> Result<StudySession>;
    /// Most recent start time first.
    fn find_sessions(&self, filter: &SessionFilter) -> Result<Vec<StudySession>>;
    fn update_session(&self, id: i64, result: &SessionResult) -> Result<StudySession>;
}
