//! Progress statistics derived from study sessions.
//!
//! Everything here is a pure function of the session snapshot and the
//! caller's "now". Calendar days are taken in the time zone of `now`, so a
//! caller passing `Local::now()` gets streaks on the local calendar.

use super::{GroupScope, LeaderboardEntry, StudySession, StudyStats};
use chrono::{DateTime, NaiveDate, TimeZone};
use std::collections::{BTreeMap, HashSet};

pub const ANONYMOUS_NAME: &str = "Anonymous User";

/// Totals, last study date and day streak over all given sessions.
pub fn compute_stats<Tz: TimeZone>(sessions: &[StudySession], now: &DateTime<Tz>) -> StudyStats {
    let sessions: Vec<&StudySession> = sessions.iter().collect();
    let mut stats = totals(&sessions);
    stats.study_streak = study_streak(&sessions, now);
    stats
}

/// Totals restricted to one group. Streaks are a user-level concept, so
/// `study_streak` is always 0 here.
pub fn compute_group_stats(sessions: &[StudySession], group_id: i64) -> StudyStats {
    let in_group: Vec<&StudySession> = sessions
        .iter()
        .filter(|s| s.scope == GroupScope::Group(group_id))
        .collect();
    totals(&in_group)
}

/// Per-user ranking: most mastered cards first, then best accuracy, then
/// user id so equal entries keep a reproducible order.
pub fn compute_leaderboard<Tz: TimeZone>(
    sessions: &[StudySession],
    now: &DateTime<Tz>,
) -> Vec<LeaderboardEntry> {
    let mut by_user: BTreeMap<&str, Vec<&StudySession>> = BTreeMap::new();
    for session in sessions {
        by_user
            .entry(session.user_id.as_str())
            .or_default()
            .push(session);
    }

    let mut entries: Vec<LeaderboardEntry> = by_user
        .into_iter()
        .map(|(user_id, user_sessions)| {
            let totals = totals(&user_sessions);
            let accuracy = if totals.total_cards > 0 {
                totals.mastered_cards as f64 / totals.total_cards as f64
            } else {
                0.0
            };
            let name = user_sessions
                .iter()
                .filter_map(|s| s.user_name.as_deref())
                .find(|name| !name.trim().is_empty())
                .unwrap_or(ANONYMOUS_NAME)
                .to_string();

            LeaderboardEntry {
                user_id: user_id.to_string(),
                name,
                study_streak: study_streak(&user_sessions, now),
                mastered_cards: totals.mastered_cards,
                accuracy,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.mastered_cards
            .cmp(&a.mastered_cards)
            .then_with(|| b.accuracy.total_cmp(&a.accuracy))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    entries
}

/// Consecutive calendar days, ending today, with at least one session.
/// Returns 0 when nothing was studied today.
pub fn study_streak<Tz: TimeZone>(sessions: &[&StudySession], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let study_days: HashSet<NaiveDate> = sessions
        .iter()
        .map(|s| s.start_time.with_timezone(&tz).date_naive())
        .collect();

    let mut day = now.date_naive();
    let mut streak = 0;
    while study_days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

fn totals(sessions: &[&StudySession]) -> StudyStats {
    let mut newest_first = sessions.to_vec();
    newest_first.sort_by(|a, b| b.start_time.cmp(&a.start_time));

    let total_cards: u64 = newest_first
        .iter()
        .map(|s| u64::from(s.cards_studied))
        .sum();
    let mastered_cards: u64 = newest_first
        .iter()
        .map(|s| u64::from(s.cards_correct))
        .sum();

    StudyStats {
        total_cards,
        mastered_cards,
        cards_to_review: total_cards.saturating_sub(mastered_cards),
        study_streak: 0,
        last_study_date: newest_first.first().map(|s| s.start_time),
    }
}
