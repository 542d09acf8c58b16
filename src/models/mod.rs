pub mod flashcard;
pub mod group;
pub mod progress;
pub mod scheduler;
pub mod study_session;
pub mod study_stats;
pub mod user;

pub use flashcard::{CardContent, Difficulty, Flashcard, FlashcardChanges, NewFlashcard};
pub use group::{FlashcardGroup, GroupChanges, GroupColor, NewGroup};
pub use study_session::{GroupScope, NewStudySession, SessionResult, StudySession};
pub use study_stats::{LeaderboardEntry, StudyStats};
pub use user::User;
