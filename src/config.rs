//! Application configuration loaded from a TOML file.
//!
//! ```toml
//! database_path = "flashcards.sqlite3"
//!
//! [user]
//! id = "ola"
//! name = "Ola"
//! ```
//!
//! A missing file yields the defaults. `FLASHCARDS_DB` overrides the database
//! path.

use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DATABASE_ENV: &str = "FLASHCARDS_DB";
pub const DEFAULT_CONFIG_FILE: &str = "flashcards.toml";
const DEFAULT_DATABASE: &str = "flashcards.sqlite3";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub user: Option<UserConfig>,
}

/// Signed-in user. Without it every command needing a user fails.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UserConfig {
    pub id: String,
    pub name: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE),
            user: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: AppConfig = toml::from_str(&contents)?;
            log::debug!("Loaded configuration from {}", path.display());
            config
        } else {
            log::debug!("No configuration at {}, using defaults", path.display());
            AppConfig::default()
        };

        if let Ok(database) = std::env::var(DATABASE_ENV) {
            if !database.is_empty() {
                config.database_path = PathBuf::from(database);
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let config: AppConfig = toml::from_str(
            r#"
database_path = "/tmp/cards.db"

[user]
id = "ola"
name = "Ola"
"#,
        )
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/cards.db"));
        let user = config.user.unwrap();
        assert_eq!(user.id, "ola");
        assert_eq!(user.name.as_deref(), Some("Ola"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[user]\nid = \"kuba\"").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.user.unwrap().id, "kuba");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_path = [").unwrap();
        assert!(AppConfig::load(file.path()).is_err());
    }
}
