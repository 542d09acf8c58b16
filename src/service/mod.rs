//! Study operations over a [`StudyStore`].
//!
//! The authenticated user is always passed in explicitly. Ownership is
//! checked here: touching a record that belongs to someone else is reported
//! as not found.

pub mod flashcards;
pub mod stats;

use crate::database::StudyStore;
use crate::error::Result;
use crate::identity::IdentityProvider;
use crate::models::User;

/// Resolves the signed-in user and records their profile so that session
/// listings carry a display name. Fails before touching the store when no
/// user is signed in.
pub fn authenticate<S, I>(store: &S, identity: &I) -> Result<User>
where
    S: StudyStore + ?Sized,
    I: IdentityProvider + ?Sized,
{
    let user = identity.current_user()?;
    store.upsert_user(&user)?;
    log::debug!("Authenticated as {} ({})", user.name, user.id);
    Ok(user)
}
