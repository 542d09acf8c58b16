//! Who is studying. Authentication itself happens elsewhere; this module only
//! answers "which user is signed in".

use crate::config::UserConfig;
use crate::error::{Result, StudyError};
use crate::models::User;

pub trait IdentityProvider {
    /// Fails with `NotAuthenticated` when nobody is signed in.
    fn current_user(&self) -> Result<User>;
}

/// Identity taken from the `[user]` section of the configuration.
pub struct ConfigIdentity {
    user: Option<UserConfig>,
}

impl ConfigIdentity {
    pub fn new(user: Option<UserConfig>) -> Self {
        Self { user }
    }
}

impl IdentityProvider for ConfigIdentity {
    fn current_user(&self) -> Result<User> {
        let config = self
            .user
            .as_ref()
            .filter(|u| !u.id.trim().is_empty())
            .ok_or(StudyError::NotAuthenticated)?;

        // Same default as sign-up: the id doubles as the display name
        let name = config
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| config.id.clone());
        Ok(User::new(config.id.clone(), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_user_is_not_authenticated() {
        let identity = ConfigIdentity::new(None);
        assert!(matches!(
            identity.current_user(),
            Err(StudyError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_blank_id_is_not_authenticated() {
        let identity = ConfigIdentity::new(Some(UserConfig {
            id: "  ".to_string(),
            name: Some("Ghost".to_string()),
        }));
        assert!(identity.current_user().is_err());
    }

    #[test]
    fn test_name_falls_back_to_id() {
        let identity = ConfigIdentity::new(Some(UserConfig {
            id: "kuba".to_string(),
            name: None,
        }));
        assert_eq!(identity.current_user().unwrap(), User::new("kuba", "kuba"));
    }
}
