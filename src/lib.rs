pub mod config;
pub mod database;
pub mod error;
pub mod export;
pub mod identity;
pub mod models;
pub mod service;

pub use error::{Result, StudyError};
pub use models::{
    Difficulty, Flashcard, FlashcardGroup, GroupScope, LeaderboardEntry, StudySession, StudyStats,
    User,
};
