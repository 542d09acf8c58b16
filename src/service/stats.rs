//! Study session lifecycle and progress statistics.

use crate::database::{GroupFilter, SessionFilter, StudyStore};
use crate::error::{Result, StudyError};
use crate::models::progress;
use crate::models::{
    GroupScope, LeaderboardEntry, NewStudySession, SessionResult, StudySession, StudyStats, User,
};
use chrono::{DateTime, TimeZone, Utc};

/// Opens a session with zero counts. A group scope must name one of the
/// user's groups.
pub fn start_session<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    scope: GroupScope,
    now: DateTime<Utc>,
) -> Result<StudySession> {
    if let GroupScope::Group(group_id) = scope {
        let owned = store.find_groups(&GroupFilter {
            id: Some(group_id),
            user_id: Some(user.id.clone()),
        })?;
        if owned.is_empty() {
            return Err(StudyError::not_found("Group", group_id));
        }
    }

    store.insert_session(&NewStudySession {
        user_id: user.id.clone(),
        scope,
        start_time: now,
    })
}

/// Writes the final counts and end time. A session can be ended only once.
pub fn end_session<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    session_id: i64,
    cards_studied: u32,
    cards_correct: u32,
    now: DateTime<Utc>,
) -> Result<StudySession> {
    if cards_correct > cards_studied {
        return Err(StudyError::InvalidCounts {
            studied: cards_studied,
            correct: cards_correct,
        });
    }

    let session = store
        .find_sessions(&SessionFilter {
            id: Some(session_id),
            user_id: Some(user.id.clone()),
            ..Default::default()
        })?
        .into_iter()
        .next()
        .ok_or_else(|| StudyError::not_found("Study session", session_id))?;
    if session.is_finished() {
        return Err(StudyError::SessionAlreadyEnded(session_id));
    }

    store.update_session(
        session_id,
        &SessionResult {
            cards_studied,
            cards_correct,
            end_time: now,
        },
    )
}

/// The user's sessions, most recent first.
pub fn user_sessions<S: StudyStore + ?Sized>(store: &S, user: &User) -> Result<Vec<StudySession>> {
    store.find_sessions(&SessionFilter {
        user_id: Some(user.id.clone()),
        ..Default::default()
    })
}

/// Totals and streak over every session of the user.
pub fn stats<S, Tz>(store: &S, user: &User, now: &DateTime<Tz>) -> Result<StudyStats>
where
    S: StudyStore + ?Sized,
    Tz: TimeZone,
{
    let sessions = user_sessions(store, user)?;
    Ok(progress::compute_stats(&sessions, now))
}

/// Totals over the user's sessions scoped to one group; the streak is not tracked.
pub fn group_stats<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    group_id: i64,
) -> Result<StudyStats> {
    let sessions = store.find_sessions(&SessionFilter {
        user_id: Some(user.id.clone()),
        scope: Some(GroupScope::Group(group_id)),
        ..Default::default()
    })?;
    Ok(progress::compute_group_stats(&sessions, group_id))
}

/// Ranking over every user's sessions.
pub fn leaderboard<S, Tz>(store: &S, now: &DateTime<Tz>) -> Result<Vec<LeaderboardEntry>>
where
    S: StudyStore + ?Sized,
    Tz: TimeZone,
{
    let sessions = store.find_sessions(&SessionFilter::default())?;
    Ok(progress::compute_leaderboard(&sessions, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteStore;
    use crate::models::NewGroup;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, 20, 15, 0, 0).unwrap()
    }

    fn setup() -> (SqliteStore, User, User) {
        let store = SqliteStore::open_in_memory().unwrap();
        let ola = User::new("ola", "Ola");
        let kuba = User::new("kuba", "Kuba");
        store.upsert_user(&ola).unwrap();
        store.upsert_user(&kuba).unwrap();
        (store, ola, kuba)
    }

    fn study(
        store: &SqliteStore,
        user: &User,
        scope: GroupScope,
        at: DateTime<Utc>,
        studied: u32,
        correct: u32,
    ) -> StudySession {
        let session = start_session(store, user, scope, at).unwrap();
        end_session(store, user, session.id, studied, correct, at + Duration::minutes(5)).unwrap()
    }

    #[test]
    fn test_session_lifecycle() {
        let (store, ola, _) = setup();
        let started = start_session(&store, &ola, GroupScope::All, now()).unwrap();
        assert_eq!(started.cards_studied, 0);
        assert!(!started.is_finished());

        let ended = end_session(&store, &ola, started.id, 10, 7, now() + Duration::minutes(3)).unwrap();
        assert_eq!(ended.cards_studied, 10);
        assert_eq!(ended.cards_correct, 7);
        assert_eq!(ended.end_time, Some(now() + Duration::minutes(3)));
    }

    #[test]
    fn test_session_ends_only_once() {
        let (store, ola, _) = setup();
        let session = study(&store, &ola, GroupScope::All, now(), 4, 4);
        assert!(matches!(
            end_session(&store, &ola, session.id, 5, 5, now()),
            Err(StudyError::SessionAlreadyEnded(id)) if id == session.id
        ));
    }

    #[test]
    fn test_end_session_rejects_bad_counts() {
        let (store, ola, _) = setup();
        let session = start_session(&store, &ola, GroupScope::All, now()).unwrap();
        assert!(matches!(
            end_session(&store, &ola, session.id, 3, 4, now()),
            Err(StudyError::InvalidCounts { studied: 3, correct: 4 })
        ));
    }

    #[test]
    fn test_foreign_session_is_not_found() {
        let (store, ola, kuba) = setup();
        let session = start_session(&store, &ola, GroupScope::All, now()).unwrap();
        assert!(matches!(
            end_session(&store, &kuba, session.id, 1, 1, now()),
            Err(StudyError::NotFound { .. })
        ));
    }

    #[test]
    fn test_start_session_in_foreign_group() {
        let (store, ola, kuba) = setup();
        let group = store.insert_group(&ola.id, &NewGroup::default(), now()).unwrap();
        assert!(matches!(
            start_session(&store, &kuba, GroupScope::Group(group.id), now()),
            Err(StudyError::NotFound { entity: "Group", .. })
        ));
        assert!(start_session(&store, &ola, GroupScope::Group(group.id), now()).is_ok());
    }

    #[test]
    fn test_stats_only_count_own_sessions() {
        let (store, ola, kuba) = setup();
        study(&store, &ola, GroupScope::All, now() - Duration::hours(1), 10, 8);
        study(&store, &ola, GroupScope::All, now() - Duration::days(1), 5, 5);
        study(&store, &kuba, GroupScope::All, now(), 50, 50);

        let summary = stats(&store, &ola, &now()).unwrap();
        assert_eq!(summary.total_cards, 15);
        assert_eq!(summary.mastered_cards, 13);
        assert_eq!(summary.cards_to_review, 2);
        assert_eq!(summary.study_streak, 2);
        assert_eq!(summary.last_study_date, Some(now() - Duration::hours(1)));
    }

    #[test]
    fn test_group_stats() {
        let (store, ola, _) = setup();
        let g = store.insert_group(&ola.id, &NewGroup::default(), now()).unwrap();
        let h = store.insert_group(&ola.id, &NewGroup::default(), now()).unwrap();
        study(&store, &ola, GroupScope::Group(g.id), now(), 6, 3);
        study(&store, &ola, GroupScope::Group(h.id), now(), 9, 9);

        let summary = group_stats(&store, &ola, g.id).unwrap();
        assert_eq!(summary.total_cards, 6);
        assert_eq!(summary.mastered_cards, 3);
        assert_eq!(summary.study_streak, 0);
    }

    #[test]
    fn test_group_stats_only_counts_own_sessions() {
        let (store, ola, kuba) = setup();
        let g = store.insert_group(&ola.id, &NewGroup::default(), now()).unwrap();
        study(&store, &ola, GroupScope::Group(g.id), now(), 4, 2);
        study(&store, &ola, GroupScope::All, now(), 10, 10);
        let foreign = store
            .insert_session(&NewStudySession {
                user_id: kuba.id.clone(),
                scope: GroupScope::Group(g.id),
                start_time: now(),
            })
            .unwrap();
        store
            .update_session(
                foreign.id,
                &SessionResult {
                    cards_studied: 7,
                    cards_correct: 7,
                    end_time: now(),
                },
            )
            .unwrap();

        let summary = group_stats(&store, &ola, g.id).unwrap();
        assert_eq!(summary.total_cards, 4);
        assert_eq!(summary.mastered_cards, 2);
        assert_eq!(summary.cards_to_review, 2);
    }

    #[test]
    fn test_leaderboard_across_users() {
        let (store, ola, kuba) = setup();
        study(&store, &ola, GroupScope::All, now(), 12, 10);
        study(&store, &kuba, GroupScope::All, now(), 10, 10);

        let board = leaderboard(&store, &now()).unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].name, "Kuba");
        assert_eq!(board[0].study_streak, 1);
        assert_eq!(board[1].name, "Ola");
    }

    #[test]
    fn test_empty_leaderboard() {
        let (store, _, _) = setup();
        assert!(leaderboard(&store, &now()).unwrap().is_empty());
    }
}
