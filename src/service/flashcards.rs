//! Group and flashcard management, card reviews and group import/export.

use crate::database::{CardFilter, GroupFilter, StudyStore};
use crate::error::{Result, StudyError};
use crate::export::json::GroupExport;
use crate::models::scheduler;
use crate::models::{
    CardContent, Flashcard, FlashcardChanges, FlashcardGroup, GroupChanges, NewFlashcard, NewGroup, User,
};
use chrono::{DateTime, Utc};

/// The user's groups with card counts, most recently updated first.
pub fn groups<S: StudyStore + ?Sized>(store: &S, user: &User) -> Result<Vec<FlashcardGroup>> {
    store.find_groups(&GroupFilter {
        user_id: Some(user.id.clone()),
        ..Default::default()
    })
}

pub fn add_group<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    group: &NewGroup,
    now: DateTime<Utc>,
) -> Result<FlashcardGroup> {
    store.insert_group(&user.id, group, now)
}

pub fn update_group<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    group_id: i64,
    changes: &GroupChanges,
    now: DateTime<Utc>,
) -> Result<FlashcardGroup> {
    owned_group(store, user, group_id)?;
    store.update_group(group_id, changes, now)
}

/// Deletes the group and every card in it.
pub fn delete_group<S: StudyStore + ?Sized>(store: &S, user: &User, group_id: i64) -> Result<()> {
    owned_group(store, user, group_id)?;
    store.delete_group(group_id)
}

/// Adds a card to one of the user's groups.
pub fn add_flashcard<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    card: &NewFlashcard,
    now: DateTime<Utc>,
) -> Result<Flashcard> {
    owned_group(store, user, card.group_id)?;
    store.insert_card(card, now)
}

pub fn update_flashcard<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    card_id: i64,
    changes: &FlashcardChanges,
) -> Result<Flashcard> {
    owned_card(store, user, card_id)?;
    store.update_card(card_id, changes)
}

pub fn delete_flashcard<S: StudyStore + ?Sized>(store: &S, user: &User, card_id: i64) -> Result<()> {
    owned_card(store, user, card_id)?;
    store.delete_card(card_id)
}

/// Records a review at `now` and schedules the next one.
pub fn mark_card_reviewed<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    card_id: i64,
    correct: bool,
    now: DateTime<Utc>,
) -> Result<Flashcard> {
    owned_card(store, user, card_id)?;
    let card = store.record_review(card_id, now, scheduler::schedule(now, correct))?;
    log::debug!(
        "Card {} reviewed ({}), next review {:?}",
        card_id,
        if correct { "correct" } else { "wrong" },
        card.next_review_date
    );
    Ok(card)
}

/// Cards of one group; the group must belong to the user.
pub fn group_cards<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    group_id: i64,
) -> Result<Vec<Flashcard>> {
    owned_group(store, user, group_id)?;
    store.find_cards(&CardFilter {
        group_id: Some(group_id),
        ..Default::default()
    })
}

/// Every card of the user, or of one group when `group_id` is given, newest
/// first. Review dates are not consulted, see [`due_cards`].
pub fn cards_for_review<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    group_id: Option<i64>,
) -> Result<Vec<Flashcard>> {
    store.find_cards(&CardFilter {
        group_id,
        user_id: Some(user.id.clone()),
        ..Default::default()
    })
}

/// Like [`cards_for_review`] but only cards whose review date has come.
pub fn due_cards<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    group_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Vec<Flashcard>> {
    let cards = cards_for_review(store, user, group_id)?;
    Ok(scheduler::due_cards(cards, now))
}

pub fn export_group<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    group_id: i64,
) -> Result<GroupExport> {
    let group = owned_group(store, user, group_id)?;
    let cards = group_cards(store, user, group_id)?;
    Ok(GroupExport::new(&group, &cards))
}

/// Creates a new group for the user holding the exported cards. Nothing is
/// kept when any card fails to insert.
pub fn import_group<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    export: &GroupExport,
    now: DateTime<Utc>,
) -> Result<FlashcardGroup> {
    let cards: Vec<CardContent> = export
        .cards
        .iter()
        .map(|card| CardContent {
            front: card.front.clone(),
            back: card.back.clone(),
            difficulty: card.difficulty,
        })
        .collect();
    store.import_group(
        &user.id,
        &NewGroup {
            name: export.name.clone(),
            description: export.description.clone(),
            color: export.color,
        },
        &cards,
        now,
    )
}

fn owned_group<S: StudyStore + ?Sized>(
    store: &S,
    user: &User,
    group_id: i64,
) -> Result<FlashcardGroup> {
    store
        .find_groups(&GroupFilter {
            id: Some(group_id),
            user_id: Some(user.id.clone()),
        })?
        .into_iter()
        .next()
        .ok_or_else(|| StudyError::not_found("Group", group_id))
}

fn owned_card<S: StudyStore + ?Sized>(store: &S, user: &User, card_id: i64) -> Result<Flashcard> {
    store
        .find_cards(&CardFilter {
            id: Some(card_id),
            user_id: Some(user.id.clone()),
            ..Default::default()
        })?
        .into_iter()
        .next()
        .ok_or_else(|| StudyError::not_found("Flashcard", card_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::SqliteStore;
    use crate::export::json::CardExport;
    use crate::models::{Difficulty, GroupColor};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 1, 10, 0, 0).unwrap()
    }

    fn setup() -> (SqliteStore, User, User) {
        let store = SqliteStore::open_in_memory().unwrap();
        let ola = User::new("ola", "Ola");
        let kuba = User::new("kuba", "Kuba");
        store.upsert_user(&ola).unwrap();
        store.upsert_user(&kuba).unwrap();
        (store, ola, kuba)
    }

    fn named(name: &str) -> NewGroup {
        NewGroup {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn card_in(group_id: i64, front: &str) -> NewFlashcard {
        NewFlashcard {
            group_id,
            front: front.to_string(),
            back: "back".to_string(),
            difficulty: Difficulty::Medium,
        }
    }

    #[test]
    fn test_groups_are_per_user() {
        let (store, ola, kuba) = setup();
        add_group(&store, &ola, &named("Polish"), now()).unwrap();
        add_group(&store, &kuba, &named("German"), now()).unwrap();

        let mine = groups(&store, &ola).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Polish");
    }

    #[test]
    fn test_groups_sorted_by_last_update() {
        let (store, ola, _) = setup();
        let first = add_group(&store, &ola, &named("First"), now()).unwrap();
        add_group(&store, &ola, &named("Second"), now() + Duration::minutes(1)).unwrap();
        let changes = GroupChanges {
            color: Some(GroupColor::Orange),
            ..Default::default()
        };
        update_group(&store, &ola, first.id, &changes, now() + Duration::minutes(2)).unwrap();

        let names: Vec<String> = groups(&store, &ola).unwrap().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_foreign_group_is_not_found() {
        let (store, ola, kuba) = setup();
        let group = add_group(&store, &ola, &named("Polish"), now()).unwrap();

        let changes = GroupChanges {
            name: Some("Mine now".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            update_group(&store, &kuba, group.id, &changes, now()),
            Err(StudyError::NotFound { entity: "Group", .. })
        ));
        assert!(matches!(
            delete_group(&store, &kuba, group.id),
            Err(StudyError::NotFound { .. })
        ));
        assert!(matches!(
            add_flashcard(&store, &kuba, &card_in(group.id, "x"), now()),
            Err(StudyError::NotFound { .. })
        ));
        assert_eq!(groups(&store, &ola).unwrap()[0].name, "Polish");
    }

    #[test]
    fn test_foreign_card_is_not_found() {
        let (store, ola, kuba) = setup();
        let group = add_group(&store, &ola, &named("Polish"), now()).unwrap();
        let card = add_flashcard(&store, &ola, &card_in(group.id, "cześć"), now()).unwrap();

        assert!(matches!(
            delete_flashcard(&store, &kuba, card.id),
            Err(StudyError::NotFound { entity: "Flashcard", .. })
        ));
        assert!(matches!(
            mark_card_reviewed(&store, &kuba, card.id, true, now()),
            Err(StudyError::NotFound { .. })
        ));
        delete_flashcard(&store, &ola, card.id).unwrap();
        assert!(group_cards(&store, &ola, group.id).unwrap().is_empty());
    }

    #[test]
    fn test_mark_card_reviewed_writes_both_dates() {
        let (store, ola, _) = setup();
        let group = add_group(&store, &ola, &named("Polish"), now()).unwrap();
        let card = add_flashcard(&store, &ola, &card_in(group.id, "proszę"), now()).unwrap();

        let reviewed = mark_card_reviewed(&store, &ola, card.id, true, now()).unwrap();
        assert_eq!(reviewed.last_reviewed, Some(now()));
        assert_eq!(reviewed.next_review_date, Some(now() + Duration::days(3)));

        let missed = mark_card_reviewed(&store, &ola, card.id, false, now()).unwrap();
        assert_eq!(missed.next_review_date, Some(now() + Duration::days(1)));
    }

    #[test]
    fn test_update_flashcard_changes_text() {
        let (store, ola, _) = setup();
        let group = add_group(&store, &ola, &named("Polish"), now()).unwrap();
        let card = add_flashcard(&store, &ola, &card_in(group.id, "cześć"), now()).unwrap();

        let changes = FlashcardChanges {
            back: Some("hi".to_string()),
            difficulty: Some(Difficulty::Easy),
            ..Default::default()
        };
        let updated = update_flashcard(&store, &ola, card.id, &changes).unwrap();
        assert_eq!(updated.front, "cześć");
        assert_eq!(updated.back, "hi");
        assert_eq!(updated.difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_editing_reviewed_card_keeps_review_dates() {
        let (store, ola, _) = setup();
        let group = add_group(&store, &ola, &named("Polish"), now()).unwrap();
        let card = add_flashcard(&store, &ola, &card_in(group.id, "jabłko"), now()).unwrap();
        mark_card_reviewed(&store, &ola, card.id, true, now()).unwrap();

        let changes = FlashcardChanges {
            front: Some("jabłko (n.)".to_string()),
            back: Some("apple".to_string()),
            difficulty: Some(Difficulty::Medium),
        };
        let edited = update_flashcard(&store, &ola, card.id, &changes).unwrap();
        assert_eq!(edited.front, "jabłko (n.)");
        assert_eq!(edited.last_reviewed, Some(now()));
        assert_eq!(edited.next_review_date, Some(now() + Duration::days(3)));
        assert!(edited.next_review_date > edited.last_reviewed);
    }

    #[test]
    fn test_cards_for_review_and_due_cards() {
        let (store, ola, kuba) = setup();
        let polish = add_group(&store, &ola, &named("Polish"), now()).unwrap();
        let german = add_group(&store, &ola, &named("German"), now()).unwrap();
        let other = add_group(&store, &kuba, &named("Kuba's"), now()).unwrap();
        let a = add_flashcard(&store, &ola, &card_in(polish.id, "a"), now()).unwrap();
        add_flashcard(&store, &ola, &card_in(polish.id, "b"), now()).unwrap();
        add_flashcard(&store, &ola, &card_in(german.id, "c"), now()).unwrap();
        add_flashcard(&store, &kuba, &card_in(other.id, "d"), now()).unwrap();

        assert_eq!(cards_for_review(&store, &ola, None).unwrap().len(), 3);
        assert_eq!(cards_for_review(&store, &ola, Some(polish.id)).unwrap().len(), 2);
        assert!(cards_for_review(&store, &ola, Some(other.id)).unwrap().is_empty());

        mark_card_reviewed(&store, &ola, a.id, true, now()).unwrap();
        let due = due_cards(&store, &ola, Some(polish.id), now() + Duration::days(1)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].front, "b");
        let later = due_cards(&store, &ola, Some(polish.id), now() + Duration::days(3)).unwrap();
        assert_eq!(later.len(), 2);
    }

    #[test]
    fn test_export_and_import_group() {
        let (store, ola, kuba) = setup();
        let group = add_group(
            &store,
            &ola,
            &NewGroup {
                name: "Polish".to_string(),
                description: "Greetings".to_string(),
                color: GroupColor::Pink,
            },
            now(),
        )
        .unwrap();
        add_flashcard(&store, &ola, &card_in(group.id, "cześć"), now()).unwrap();
        add_flashcard(&store, &ola, &card_in(group.id, "hej"), now()).unwrap();

        let export = export_group(&store, &ola, group.id).unwrap();
        assert_eq!(export.color, GroupColor::Pink);
        assert_eq!(export.cards.len(), 2);
        assert!(export.cards.contains(&CardExport {
            front: "hej".to_string(),
            back: "back".to_string(),
            difficulty: Difficulty::Medium,
        }));

        let imported = import_group(&store, &kuba, &export, now()).unwrap();
        assert_eq!(imported.user_id, "kuba");
        assert_eq!(imported.description, "Greetings");
        assert_eq!(imported.card_count, 2);
    }
}
