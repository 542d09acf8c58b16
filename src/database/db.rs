//! SQLite implementation of the study store
//!
//! Handles schema initialization and CRUD for users, flashcard groups,
//! flashcards and study sessions. Timestamps are stored as unix seconds.

use super::{CardFilter, GroupFilter, SessionFilter, StudyStore};
use crate::error::{Result, StudyError};
use crate::models::{
    CardContent, Difficulty, Flashcard, FlashcardChanges, FlashcardGroup, GroupChanges, GroupColor,
    GroupScope, NewFlashcard, NewGroup, NewStudySession, SessionResult, StudySession, User,
};
use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, Row, ToSql, params, params_from_iter};
use std::path::Path;

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database file and makes sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        log::debug!("Opened database at {}", path.as_ref().display());
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_database(&conn)?;
        Ok(Self { conn })
    }

    fn group_by_id(&self, id: i64) -> Result<FlashcardGroup> {
        let filter = GroupFilter {
            id: Some(id),
            ..Default::default()
        };
        first_or_not_found(self.find_groups(&filter)?, "Group", id)
    }

    fn card_by_id(&self, id: i64) -> Result<Flashcard> {
        let filter = CardFilter {
            id: Some(id),
            ..Default::default()
        };
        first_or_not_found(self.find_cards(&filter)?, "Flashcard", id)
    }

    fn session_by_id(&self, id: i64) -> Result<StudySession> {
        let filter = SessionFilter {
            id: Some(id),
            ..Default::default()
        };
        first_or_not_found(self.find_sessions(&filter)?, "Study session", id)
    }
}

/// Creates tables for users, groups, flashcards and study sessions.
///
/// Foreign keys are switched on so deleting a group removes its cards.
pub fn init_database(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS flashcard_groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            color TEXT NOT NULL DEFAULT 'blue',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS flashcards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            group_id INTEGER NOT NULL,
            front TEXT NOT NULL,
            back TEXT NOT NULL,
            difficulty TEXT NOT NULL DEFAULT 'medium',
            last_reviewed INTEGER,
            next_review_date INTEGER,
            created_at INTEGER NOT NULL,
            FOREIGN KEY (group_id) REFERENCES flashcard_groups(id) ON DELETE CASCADE
        )",
        (),
    )?;

    // group_id NULL means the session covered all groups
    conn.execute(
        "CREATE TABLE IF NOT EXISTS study_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            group_id INTEGER,
            start_time INTEGER NOT NULL,
            end_time INTEGER,
            cards_studied INTEGER NOT NULL DEFAULT 0,
            cards_correct INTEGER NOT NULL DEFAULT 0
        )",
        (),
    )?;

    Ok(())
}

impl StudyStore for SqliteStore {
    fn upsert_user(&self, user: &User) -> Result<()> {
        self.conn.execute(
            "INSERT INTO users (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![user.id, user.name],
        )?;
        Ok(())
    }

    fn insert_group(
        &self,
        user_id: &str,
        group: &NewGroup,
        now: DateTime<Utc>,
    ) -> Result<FlashcardGroup> {
        let id = insert_group_row(&self.conn, user_id, group, now)?;
        log::info!("Group '{}' created with id {}", group.name, id);
        self.group_by_id(id)
    }

    fn import_group(
        &self,
        user_id: &str,
        group: &NewGroup,
        cards: &[CardContent],
        now: DateTime<Utc>,
    ) -> Result<FlashcardGroup> {
        // Rolled back on drop if any insert fails
        let tx = self.conn.unchecked_transaction()?;
        let id = insert_group_row(&tx, user_id, group, now)?;
        for card in cards {
            insert_card_row(
                &tx,
                &NewFlashcard {
                    group_id: id,
                    front: card.front.clone(),
                    back: card.back.clone(),
                    difficulty: card.difficulty,
                },
                now,
            )?;
        }
        tx.commit()?;
        log::info!(
            "Group '{}' imported with id {} and {} cards",
            group.name,
            id,
            cards.len()
        );
        self.group_by_id(id)
    }

    fn find_groups(&self, filter: &GroupFilter) -> Result<Vec<FlashcardGroup>> {
        let mut conditions = Conditions::default();
        if let Some(id) = filter.id {
            conditions.eq("g.id", id);
        }
        if let Some(user_id) = &filter.user_id {
            conditions.eq("g.user_id", user_id.clone());
        }

        let sql = format!(
            "SELECT g.id, g.user_id, g.name, g.description, g.color, g.created_at, g.updated_at,
                    (SELECT COUNT(*) FROM flashcards f WHERE f.group_id = g.id)
             FROM flashcard_groups g{}
             ORDER BY g.updated_at DESC, g.id DESC",
            conditions.where_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let groups = stmt
            .query_map(params_from_iter(conditions.values), group_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(groups)
    }

    fn update_group(
        &self,
        id: i64,
        changes: &GroupChanges,
        now: DateTime<Utc>,
    ) -> Result<FlashcardGroup> {
        let mut assignments = Assignments::default();
        if let Some(name) = &changes.name {
            assignments.set("name", name.clone());
        }
        if let Some(description) = &changes.description {
            assignments.set("description", description.clone());
        }
        if let Some(color) = changes.color {
            assignments.set("color", color.as_str().to_string());
        }
        assignments.set("updated_at", now.timestamp());

        let updated = assignments.execute(&self.conn, "flashcard_groups", id)?;
        if updated == 0 {
            return Err(StudyError::not_found("Group", id));
        }
        log::debug!("Group {} updated", id);
        self.group_by_id(id)
    }

    fn delete_group(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM flashcard_groups WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StudyError::not_found("Group", id));
        }
        log::info!("Group {} deleted", id);
        Ok(())
    }

    fn insert_card(&self, card: &NewFlashcard, now: DateTime<Utc>) -> Result<Flashcard> {
        let id = insert_card_row(&self.conn, card, now)?;
        log::info!("Flashcard {} added to group {}", id, card.group_id);
        self.card_by_id(id)
    }

    fn find_cards(&self, filter: &CardFilter) -> Result<Vec<Flashcard>> {
        let mut conditions = Conditions::default();
        if let Some(id) = filter.id {
            conditions.eq("f.id", id);
        }
        if let Some(group_id) = filter.group_id {
            conditions.eq("f.group_id", group_id);
        }
        if let Some(user_id) = &filter.user_id {
            conditions.eq("g.user_id", user_id.clone());
        }

        let sql = format!(
            "SELECT f.id, f.group_id, f.front, f.back, f.difficulty,
                    f.last_reviewed, f.next_review_date, f.created_at
             FROM flashcards f
             JOIN flashcard_groups g ON g.id = f.group_id{}
             ORDER BY f.created_at DESC, f.id DESC",
            conditions.where_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let cards = stmt
            .query_map(params_from_iter(conditions.values), card_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cards)
    }

    fn update_card(&self, id: i64, changes: &FlashcardChanges) -> Result<Flashcard> {
        let mut assignments = Assignments::default();
        if let Some(front) = &changes.front {
            assignments.set("front", front.clone());
        }
        if let Some(back) = &changes.back {
            assignments.set("back", back.clone());
        }
        if let Some(difficulty) = changes.difficulty {
            assignments.set("difficulty", difficulty.as_str().to_string());
        }

        if assignments.is_empty() {
            return self.card_by_id(id);
        }
        let updated = assignments.execute(&self.conn, "flashcards", id)?;
        if updated == 0 {
            return Err(StudyError::not_found("Flashcard", id));
        }
        log::debug!("Flashcard {} updated", id);
        self.card_by_id(id)
    }

    fn record_review(
        &self,
        id: i64,
        last_reviewed: DateTime<Utc>,
        next_review_date: DateTime<Utc>,
    ) -> Result<Flashcard> {
        let updated = self.conn.execute(
            "UPDATE flashcards SET last_reviewed = ?1, next_review_date = ?2 WHERE id = ?3",
            params![last_reviewed.timestamp(), next_review_date.timestamp(), id],
        )?;
        if updated == 0 {
            return Err(StudyError::not_found("Flashcard", id));
        }
        self.card_by_id(id)
    }

    fn delete_card(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM flashcards WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StudyError::not_found("Flashcard", id));
        }
        log::info!("Flashcard {} deleted", id);
        Ok(())
    }

    fn insert_session(&self, session: &NewStudySession) -> Result<StudySession> {
        self.conn.execute(
            "INSERT INTO study_sessions (user_id, group_id, start_time, cards_studied, cards_correct)
             VALUES (?1, ?2, ?3, 0, 0)",
            params![
                session.user_id,
                session.scope.group_id(),
                session.start_time.timestamp()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        log::info!(
            "Study session {} started for user {} (groups: {})",
            id,
            session.user_id,
            session.scope
        );
        self.session_by_id(id)
    }

    fn find_sessions(&self, filter: &SessionFilter) -> Result<Vec<StudySession>> {
        let mut conditions = Conditions::default();
        if let Some(id) = filter.id {
            conditions.eq("s.id", id);
        }
        if let Some(user_id) = &filter.user_id {
            conditions.eq("s.user_id", user_id.clone());
        }
        match filter.scope {
            Some(GroupScope::Group(group_id)) => conditions.eq("s.group_id", group_id),
            Some(GroupScope::All) => conditions.raw("s.group_id IS NULL"),
            None => {}
        }

        let sql = format!(
            "SELECT s.id, s.user_id, u.name, s.group_id, s.start_time, s.end_time,
                    s.cards_studied, s.cards_correct
             FROM study_sessions s
             LEFT JOIN users u ON u.id = s.user_id{}
             ORDER BY s.start_time DESC, s.id DESC",
            conditions.where_clause()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let sessions = stmt
            .query_map(params_from_iter(conditions.values), session_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(sessions)
    }

    fn update_session(&self, id: i64, result: &SessionResult) -> Result<StudySession> {
        let updated = self.conn.execute(
            "UPDATE study_sessions
             SET cards_studied = ?1, cards_correct = ?2, end_time = ?3
             WHERE id = ?4 AND end_time IS NULL",
            params![
                result.cards_studied,
                result.cards_correct,
                result.end_time.timestamp(),
                id
            ],
        )?;
        if updated == 0 {
            // Either missing or already finalized
            self.session_by_id(id)?;
            return Err(StudyError::SessionAlreadyEnded(id));
        }
        log::info!(
            "Study session {} ended: {}/{} correct",
            id,
            result.cards_correct,
            result.cards_studied
        );
        self.session_by_id(id)
    }
}

impl ToSql for Difficulty {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Difficulty {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

impl ToSql for GroupColor {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GroupColor {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// WHERE clause built from exact-match conditions
#[derive(Default)]
struct Conditions {
    clauses: Vec<String>,
    values: Vec<Value>,
}

impl Conditions {
    fn eq(&mut self, column: &str, value: impl Into<Value>) {
        self.values.push(value.into());
        self.clauses
            .push(format!("{} = ?{}", column, self.values.len()));
    }

    fn raw(&mut self, clause: &str) {
        self.clauses.push(clause.to_string());
    }

    fn where_clause(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }
}

/// SET list for a partial update by id
#[derive(Default)]
struct Assignments {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Assignments {
    fn set(&mut self, column: &str, value: impl Into<Value>) {
        self.values.push(value.into());
        self.columns
            .push(format!("{} = ?{}", column, self.values.len()));
    }

    fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the number of updated rows
    fn execute(mut self, conn: &Connection, table: &str, id: i64) -> Result<usize> {
        self.values.push(Value::Integer(id));
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            self.columns.join(", "),
            self.values.len()
        );
        Ok(conn.execute(&sql, params_from_iter(self.values))?)
    }
}

fn insert_group_row(
    conn: &Connection,
    user_id: &str,
    group: &NewGroup,
    now: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO flashcard_groups (user_id, name, description, color, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            user_id,
            group.name,
            group.description,
            group.color,
            now.timestamp()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn insert_card_row(conn: &Connection, card: &NewFlashcard, now: DateTime<Utc>) -> Result<i64> {
    conn.execute(
        "INSERT INTO flashcards (group_id, front, back, difficulty, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            card.group_id,
            card.front,
            card.back,
            card.difficulty,
            now.timestamp()
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn first_or_not_found<T>(rows: Vec<T>, entity: &'static str, id: i64) -> Result<T> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StudyError::not_found(entity, id))
}

fn timestamp(secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(rusqlite::Error::IntegralValueOutOfRange(0, secs))
}

fn optional_timestamp(secs: Option<i64>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    secs.map(timestamp).transpose()
}

fn group_from_row(row: &Row<'_>) -> rusqlite::Result<FlashcardGroup> {
    Ok(FlashcardGroup {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        color: row.get(4)?,
        created_at: timestamp(row.get(5)?)?,
        updated_at: timestamp(row.get(6)?)?,
        card_count: row.get::<_, i64>(7)? as usize,
    })
}

fn card_from_row(row: &Row<'_>) -> rusqlite::Result<Flashcard> {
    Ok(Flashcard {
        id: row.get(0)?,
        group_id: row.get(1)?,
        front: row.get(2)?,
        back: row.get(3)?,
        difficulty: row.get(4)?,
        last_reviewed: optional_timestamp(row.get(5)?)?,
        next_review_date: optional_timestamp(row.get(6)?)?,
        created_at: timestamp(row.get(7)?)?,
    })
}

fn session_from_row(row: &Row<'_>) -> rusqlite::Result<StudySession> {
    Ok(StudySession {
        id: row.get(0)?,
        user_id: row.get(1)?,
        user_name: row.get(2)?,
        scope: GroupScope::from_group(row.get(3)?),
        start_time: timestamp(row.get(4)?)?,
        end_time: optional_timestamp(row.get(5)?)?,
        cards_studied: row.get(6)?,
        cards_correct: row.get(7)?,
    })
}
