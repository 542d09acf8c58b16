//! Two-tier review scheduler.
//!
//! A card answered correctly comes back after a longer interval, a missed card
//! comes back the next day:
//! - correct: review again in 3 days
//! - incorrect: review again in 1 day
//!
//! There is no per-card ease factor; the interval depends only on the outcome
//! of the latest review.

use super::Flashcard;
use chrono::{DateTime, Duration, Utc};

pub const CORRECT_INTERVAL_DAYS: i64 = 3;
pub const RETRY_INTERVAL_DAYS: i64 = 1;

/// Calculates the next review date for a card reviewed at `now`.
pub fn schedule(now: DateTime<Utc>, correct: bool) -> DateTime<Utc> {
    let days = if correct {
        CORRECT_INTERVAL_DAYS
    } else {
        RETRY_INTERVAL_DAYS
    };
    now + Duration::days(days)
}

/// Cards whose next review date has been reached, in input order.
pub fn due_cards(cards: Vec<Flashcard>, now: DateTime<Utc>) -> Vec<Flashcard> {
    cards.into_iter().filter(|card| card.is_due(now)).collect()
}
