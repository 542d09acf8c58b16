//! Command handlers for the flashcards CLI.
//! Validates user input, calls the study services and prints the results.

use anyhow::{Context, bail};
use chrono::{DateTime, Local, Utc};
use flashcards_app::config::AppConfig;
use flashcards_app::database::SqliteStore;
use flashcards_app::export::json::{export_json_to_path, import_json};
use flashcards_app::identity::ConfigIdentity;
use flashcards_app::models::{
    Difficulty, Flashcard, FlashcardChanges, FlashcardGroup, GroupChanges, GroupColor, GroupScope,
    NewFlashcard, NewGroup, StudySession, StudyStats, User,
};
use flashcards_app::service::{self, flashcards, stats};
use serde::Serialize;
use std::path::Path;

const MAX_CARD_TEXT: usize = 50;
const MAX_GROUP_NAME: usize = 50;
const MAX_GROUP_DESCRIPTION: usize = 200;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Outcome {
    Correct,
    Wrong,
}

pub struct App {
    store: SqliteStore,
    identity: ConfigIdentity,
    json: bool,
}

/// Formats a timestamp as a local YYYY-MM-DD string
fn format_date(time: DateTime<Utc>) -> String {
    let datetime: DateTime<Local> = time.into();
    datetime.format("%Y-%m-%d").to_string()
}

fn format_optional_date(time: Option<DateTime<Utc>>) -> String {
    time.map(format_date).unwrap_or_else(|| "never".to_string())
}

/// Trims the input and checks it is non-empty and within `max` characters.
fn required_text(label: &str, value: &str, max: usize) -> anyhow::Result<String> {
    let value = value.trim();
    if value.is_empty() {
        bail!("{} is required", label);
    }
    if value.chars().count() > max {
        bail!("{} must be {} characters or less", label, max);
    }
    Ok(value.to_string())
}

fn optional_text(label: &str, value: Option<String>, max: usize) -> anyhow::Result<Option<String>> {
    value.map(|v| required_text(label, &v, max)).transpose()
}

fn description_text(value: &str) -> anyhow::Result<String> {
    let value = value.trim();
    if value.chars().count() > MAX_GROUP_DESCRIPTION {
        bail!(
            "Description must be {} characters or less",
            MAX_GROUP_DESCRIPTION
        );
    }
    Ok(value.to_string())
}

impl App {
    pub fn new(config: AppConfig, json: bool) -> anyhow::Result<Self> {
        let store = SqliteStore::open(&config.database_path).with_context(|| {
            format!(
                "Failed to open database at {}",
                config.database_path.display()
            )
        })?;
        Ok(Self {
            store,
            identity: ConfigIdentity::new(config.user),
            json,
        })
    }

    fn user(&self) -> anyhow::Result<User> {
        Ok(service::authenticate(&self.store, &self.identity)?)
    }

    fn print_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn print_group(&self, group: &FlashcardGroup) -> anyhow::Result<()> {
        if self.json {
            return self.print_json(group);
        }
        println!(
            "[{}] {} ({} cards, {}) updated {}",
            group.id,
            group.name,
            group.card_count,
            group.color,
            format_date(group.updated_at)
        );
        if !group.description.is_empty() {
            println!("    {}", group.description);
        }
        Ok(())
    }

    fn print_cards(&self, cards: &[Flashcard]) -> anyhow::Result<()> {
        if self.json {
            return self.print_json(&cards);
        }
        if cards.is_empty() {
            println!("No cards.");
        }
        for card in cards {
            println!(
                "[{}] {} -> {} ({}, group {}) last reviewed {}, next review {}",
                card.id,
                card.front,
                card.back,
                card.difficulty,
                card.group_id,
                format_optional_date(card.last_reviewed),
                format_optional_date(card.next_review_date)
            );
        }
        Ok(())
    }

    fn print_session(&self, session: &StudySession) -> anyhow::Result<()> {
        if self.json {
            return self.print_json(session);
        }
        let status = match session.end_time {
            Some(end) => format!("ended {}", format_date(end)),
            None => "in progress".to_string(),
        };
        println!(
            "[{}] groups: {}, started {}, {}/{} correct, {}",
            session.id,
            session.scope,
            format_date(session.start_time),
            session.cards_correct,
            session.cards_studied,
            status
        );
        Ok(())
    }

    fn print_stats(&self, stats: &StudyStats) -> anyhow::Result<()> {
        if self.json {
            return self.print_json(stats);
        }
        println!("Cards studied:   {}", stats.total_cards);
        println!("Mastered:        {}", stats.mastered_cards);
        println!("To review:       {}", stats.cards_to_review);
        println!("Study streak:    {} days", stats.study_streak);
        println!(
            "Last studied:    {}",
            format_optional_date(stats.last_study_date)
        );
        Ok(())
    }

    pub fn add_group(&self, name: &str, description: &str, color: GroupColor) -> anyhow::Result<()> {
        let user = self.user()?;
        let group = NewGroup {
            name: required_text("Group name", name, MAX_GROUP_NAME)?,
            description: description_text(description)?,
            color,
        };
        let group = flashcards::add_group(&self.store, &user, &group, Utc::now())?;
        self.print_group(&group)
    }

    pub fn list_groups(&self) -> anyhow::Result<()> {
        let user = self.user()?;
        let groups = flashcards::groups(&self.store, &user)?;
        if self.json {
            return self.print_json(&groups);
        }
        if groups.is_empty() {
            println!("No groups yet.");
        }
        for group in &groups {
            self.print_group(group)?;
        }
        Ok(())
    }

    pub fn edit_group(
        &self,
        id: i64,
        name: Option<String>,
        description: Option<String>,
        color: Option<GroupColor>,
    ) -> anyhow::Result<()> {
        let user = self.user()?;
        let changes = GroupChanges {
            name: optional_text("Group name", name, MAX_GROUP_NAME)?,
            description: description.as_deref().map(description_text).transpose()?,
            color,
        };
        let group = flashcards::update_group(&self.store, &user, id, &changes, Utc::now())?;
        self.print_group(&group)
    }

    pub fn delete_group(&self, id: i64) -> anyhow::Result<()> {
        let user = self.user()?;
        flashcards::delete_group(&self.store, &user, id)?;
        println!("Group {} deleted.", id);
        Ok(())
    }

    pub fn add_card(
        &self,
        group_id: i64,
        front: &str,
        back: &str,
        difficulty: Difficulty,
    ) -> anyhow::Result<()> {
        let user = self.user()?;
        let card = NewFlashcard {
            group_id,
            front: required_text("Front content", front, MAX_CARD_TEXT)?,
            back: required_text("Back content", back, MAX_CARD_TEXT)?,
            difficulty,
        };
        let card = flashcards::add_flashcard(&self.store, &user, &card, Utc::now())?;
        self.print_cards(std::slice::from_ref(&card))
    }

    pub fn list_cards(&self, group_id: Option<i64>) -> anyhow::Result<()> {
        let user = self.user()?;
        let cards = match group_id {
            Some(id) => flashcards::group_cards(&self.store, &user, id)?,
            None => flashcards::cards_for_review(&self.store, &user, None)?,
        };
        self.print_cards(&cards)
    }

    pub fn due_cards(&self, group_id: Option<i64>) -> anyhow::Result<()> {
        let user = self.user()?;
        let cards = flashcards::due_cards(&self.store, &user, group_id, Utc::now())?;
        self.print_cards(&cards)
    }

    pub fn edit_card(
        &self,
        id: i64,
        front: Option<String>,
        back: Option<String>,
        difficulty: Option<Difficulty>,
    ) -> anyhow::Result<()> {
        let user = self.user()?;
        let changes = FlashcardChanges {
            front: optional_text("Front content", front, MAX_CARD_TEXT)?,
            back: optional_text("Back content", back, MAX_CARD_TEXT)?,
            difficulty,
        };
        let card = flashcards::update_flashcard(&self.store, &user, id, &changes)?;
        self.print_cards(std::slice::from_ref(&card))
    }

    pub fn delete_card(&self, id: i64) -> anyhow::Result<()> {
        let user = self.user()?;
        flashcards::delete_flashcard(&self.store, &user, id)?;
        println!("Card {} deleted.", id);
        Ok(())
    }

    pub fn review(&self, card_id: i64, outcome: Outcome) -> anyhow::Result<()> {
        let user = self.user()?;
        let correct = matches!(outcome, Outcome::Correct);
        let card = flashcards::mark_card_reviewed(&self.store, &user, card_id, correct, Utc::now())?;
        self.print_cards(std::slice::from_ref(&card))
    }

    pub fn start_session(&self, scope: GroupScope) -> anyhow::Result<()> {
        let user = self.user()?;
        let session = stats::start_session(&self.store, &user, scope, Utc::now())?;
        self.print_session(&session)
    }

    pub fn end_session(&self, id: i64, studied: u32, correct: u32) -> anyhow::Result<()> {
        let user = self.user()?;
        let session = stats::end_session(&self.store, &user, id, studied, correct, Utc::now())?;
        self.print_session(&session)
    }

    pub fn list_sessions(&self) -> anyhow::Result<()> {
        let user = self.user()?;
        let sessions = stats::user_sessions(&self.store, &user)?;
        if self.json {
            return self.print_json(&sessions);
        }
        if sessions.is_empty() {
            println!("No study sessions yet.");
        }
        for session in &sessions {
            self.print_session(session)?;
        }
        Ok(())
    }

    pub fn stats(&self, group_id: Option<i64>) -> anyhow::Result<()> {
        let user = self.user()?;
        let summary = match group_id {
            Some(id) => stats::group_stats(&self.store, &user, id)?,
            None => stats::stats(&self.store, &user, &Local::now())?,
        };
        self.print_stats(&summary)
    }

    pub fn leaderboard(&self) -> anyhow::Result<()> {
        let entries = stats::leaderboard(&self.store, &Local::now())?;
        if self.json {
            return self.print_json(&entries);
        }
        if entries.is_empty() {
            println!("Nobody has studied yet.");
        }
        for (rank, entry) in entries.iter().enumerate() {
            println!(
                "{:>3}. {:<24} {:>5} mastered {:>5.1}% accuracy {:>3} day streak",
                rank + 1,
                entry.name,
                entry.mastered_cards,
                entry.accuracy * 100.0,
                entry.study_streak
            );
        }
        Ok(())
    }

    pub fn export(&self, group_id: i64, path: &Path) -> anyhow::Result<()> {
        let user = self.user()?;
        let export = flashcards::export_group(&self.store, &user, group_id)?;
        export_json_to_path(&export, path)?;
        println!(
            "Group '{}' exported to '{}'",
            export.name,
            path.display()
        );
        Ok(())
    }

    pub fn import(&self, path: &Path) -> anyhow::Result<()> {
        let user = self.user()?;
        let export = import_json(path)
            .with_context(|| format!("Failed to import '{}'", path.display()))?;
        for card in &export.cards {
            required_text("Front content", &card.front, MAX_CARD_TEXT)?;
            required_text("Back content", &card.back, MAX_CARD_TEXT)?;
        }
        required_text("Group name", &export.name, MAX_GROUP_NAME)?;
        description_text(&export.description)?;

        let group = flashcards::import_group(&self.store, &user, &export, Utc::now())?;
        self.print_group(&group)
    }
}
