//! Typed view over the persisted session keys. Only `AuthContext` holds a
//! `SessionStore`; guards and views read the in-memory state instead.

use super::types::UserRecord;
use crate::{
    errors::AppError,
    storage::{keys, Storage},
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::debug;

/// What the store holds right now, before any validation.
#[derive(Debug, Default)]
pub struct StoredSession {
    pub token: Option<SecretString>,
    pub refresh_token: Option<SecretString>,
    pub user: Option<String>,
}

/// Outcome of reading the persisted session.
#[derive(Debug)]
pub enum Restored {
    /// Token and a structurally valid user record.
    Valid { token: SecretString, user: UserRecord },
    /// Nothing persisted.
    Absent,
    /// Something persisted but unusable; the caller should wipe it.
    Malformed,
}

#[derive(Clone, Debug)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    #[must_use]
    pub fn read(&self) -> StoredSession {
        StoredSession {
            token: self.non_empty(keys::AUTH_TOKEN).map(SecretString::from),
            refresh_token: self.non_empty(keys::REFRESH_TOKEN).map(SecretString::from),
            user: self.non_empty(keys::USER_DATA),
        }
    }

    /// Reads and validates the persisted session. The user record may be stored
    /// flat or nested; both normalize to the flat form.
    #[must_use]
    pub fn restore(&self) -> Restored {
        let stored = self.read();
        match (stored.token, stored.user) {
            (Some(token), Some(raw)) => match UserRecord::from_json(&raw) {
                Some(user) => Restored::Valid { token, user },
                None => Restored::Malformed,
            },
            (None, None) => Restored::Absent,
            (Some(_), None) | (None, Some(_)) => Restored::Malformed,
        }
    }

    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.non_empty(keys::AUTH_TOKEN).map(SecretString::from)
    }

    /// Persists the bearer token and replaces (or removes) the refresh token.
    ///
    /// # Errors
    /// Returns `AppError::Storage` when the store cannot be written.
    pub fn write_tokens(
        &self,
        token: &SecretString,
        refresh_token: Option<&SecretString>,
    ) -> Result<(), AppError> {
        self.storage.set(keys::AUTH_TOKEN, token.expose_secret())?;
        match refresh_token {
            Some(refresh) => self.storage.set(keys::REFRESH_TOKEN, refresh.expose_secret()),
            None => self.storage.remove(keys::REFRESH_TOKEN),
        }
    }

    /// Persists the user record, always in the flat form.
    ///
    /// # Errors
    /// Returns `AppError::Serialization` or `AppError::Storage` on failure.
    pub fn write_user(&self, user: &UserRecord) -> Result<(), AppError> {
        let raw = serde_json::to_string(user)
            .map_err(|err| AppError::Serialization(format!("Failed to encode user: {err}")))?;
        self.storage.set(keys::USER_DATA, &raw)
    }

    /// Removes every persisted key, not only the auth ones.
    ///
    /// # Errors
    /// Returns `AppError::Storage` when the store cannot be emptied.
    pub fn clear_all(&self) -> Result<(), AppError> {
        debug!("clearing all persisted keys");
        self.storage.clear()
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.storage.get(key).filter(|value| !value.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{features::auth::types::Role, storage::MemoryStorage};

    fn store() -> (Arc<MemoryStorage>, SessionStore) {
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionStore::new(storage.clone());
        (storage, session)
    }

    #[test]
    fn restore_accepts_nested_user_shape() {
        let (storage, session) = store();
        storage.set(keys::AUTH_TOKEN, "t1").unwrap();
        storage
            .set(keys::USER_DATA, r#"{"user":{"id":"u1","role":"TRAINER"}}"#)
            .unwrap();

        match session.restore() {
            Restored::Valid { token, user } => {
                assert_eq!(token.expose_secret(), "t1");
                assert_eq!(user, UserRecord::new("u1", Role::Trainer));
            }
            other => panic!("expected a valid session, got {other:?}"),
        }
    }

    #[test]
    fn restore_reports_absent_and_malformed() {
        let (storage, session) = store();
        assert!(matches!(session.restore(), Restored::Absent));

        storage.set(keys::AUTH_TOKEN, "t1").unwrap();
        assert!(matches!(session.restore(), Restored::Malformed));

        storage.set(keys::USER_DATA, r#"{"id":"u1","role":"ROOT"}"#).unwrap();
        assert!(matches!(session.restore(), Restored::Malformed));

        storage.set(keys::USER_DATA, "not json").unwrap();
        assert!(matches!(session.restore(), Restored::Malformed));
    }

    #[test]
    fn write_user_stores_flat_form() {
        let (storage, session) = store();
        session
            .write_user(&UserRecord::new("u1", Role::User))
            .unwrap();
        assert_eq!(
            storage.get(keys::USER_DATA),
            Some(r#"{"id":"u1","role":"USER"}"#.to_string())
        );
    }

    #[test]
    fn write_tokens_drops_stale_refresh_token() {
        let (storage, session) = store();
        storage.set(keys::REFRESH_TOKEN, "old").unwrap();
        session
            .write_tokens(&SecretString::from("t2".to_string()), None)
            .unwrap();
        assert_eq!(storage.get(keys::AUTH_TOKEN), Some("t2".to_string()));
        assert_eq!(storage.get(keys::REFRESH_TOKEN), None);
    }

    #[test]
    fn clear_all_wipes_preferences_too() {
        let (storage, session) = store();
        storage.set(keys::AUTH_TOKEN, "t1").unwrap();
        storage.set(keys::THEME, "dark").unwrap();
        storage.set(keys::LANGUAGE, "fr").unwrap();
        session.clear_all().unwrap();
        assert!(storage.keys().is_empty());
    }
}
