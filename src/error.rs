use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Study session {0} has already ended")]
    SessionAlreadyEnded(i64),

    #[error("Invalid session counts: {correct} correct out of {studied} studied")]
    InvalidCounts { studied: u32, correct: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

impl StudyError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StudyError::NotFound { entity, id }
    }
}

pub type Result<T> = std::result::Result<T, StudyError>;
