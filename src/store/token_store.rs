// Token store: the single owner of the persisted session entry

use std::sync::Arc;

use crate::auth::models::Session;
use crate::store::backend::{SessionStorage, StorageError};

/// Storage key holding the serialized session
pub const SESSION_KEY: &str = "trek_session";

/// Outcome of reading the persisted session
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    Loaded(Session),
    Empty,
    /// The entry exists but cannot be used; the reason is for logs only
    Corrupt(String),
}

impl LoadResult {
    pub fn into_session(self) -> Option<Session> {
        match self {
            LoadResult::Loaded(session) => Some(session),
            LoadResult::Empty | LoadResult::Corrupt(_) => None,
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, LoadResult::Corrupt(_))
    }
}

/// Durable persistence of the current session under one fixed key
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn SessionStorage>,
    key: String,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_key(storage, SESSION_KEY)
    }

    pub fn with_key(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Persist the session, replacing any previous one
    ///
    /// A blank user id is rejected: it would read back as no id at all.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        if session.user.id.as_deref().map_or(false, |id| id.trim().is_empty()) {
            return Err(StorageError::InvalidEntry("user id is blank".to_string()));
        }
        let serialized = serde_json::to_string(session)?;
        self.storage.set(&self.key, &serialized)?;
        tracing::debug!("Persisted session for role {}", session.role());
        Ok(())
    }

    /// Read the persisted session
    ///
    /// Never fails: unreadable or malformed entries come back as `Corrupt`
    /// so startup can always fall through to a logged-out state.
    pub fn load(&self) -> LoadResult {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return LoadResult::Empty,
            Err(e) => {
                tracing::warn!("Failed to read persisted session: {}", e);
                return LoadResult::Corrupt(e.to_string());
            }
        };

        if raw.trim().is_empty() || raw.trim() == "null" {
            return LoadResult::Empty;
        }

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if session.token.trim().is_empty() => {
                tracing::warn!("Persisted session has no token, ignoring it");
                LoadResult::Corrupt("missing token".to_string())
            }
            Ok(session) => LoadResult::Loaded(session),
            Err(e) => {
                tracing::warn!("Persisted session is malformed, ignoring it: {}", e);
                LoadResult::Corrupt(e.to_string())
            }
        }
    }

    /// Remove the persisted session
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(&self.key)?;
        tracing::debug!("Cleared persisted session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::{Role, User};
    use crate::store::backend::{FileStorage, MemoryStorage};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn memory_store() -> (Arc<MemoryStorage>, TokenStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = TokenStore::new(storage.clone());
        (storage, store)
    }

    fn sample_session(role: Role) -> Session {
        Session {
            user: User {
                id: Some("u-1".to_string()),
                name: "Pema".to_string(),
                email: Some("pema@example.com".to_string()),
                role,
                phone: Some("+977 9800000000".to_string()),
            },
            token: "token-abc".to_string(),
            token_issued_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            token_expires_at: Some(Utc.timestamp_opt(1_700_086_400, 0).unwrap()),
        }
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (_, store) = memory_store();
        let session = sample_session(Role::Vendor);
        store.save(&session).unwrap();
        assert_eq!(store.load(), LoadResult::Loaded(session));
    }

    #[test]
    fn test_save_overwrites_previous_session() {
        let (_, store) = memory_store();
        store.save(&sample_session(Role::Customer)).unwrap();

        let mut newer = sample_session(Role::Admin);
        newer.token = "token-newer".to_string();
        store.save(&newer).unwrap();

        assert_eq!(store.load().into_session().unwrap().token, "token-newer");
    }

    #[test]
    fn test_save_rejects_blank_user_id() {
        let (storage, store) = memory_store();
        let mut session = sample_session(Role::Customer);
        session.user.id = Some("  ".to_string());

        assert!(matches!(
            store.save(&session),
            Err(StorageError::InvalidEntry(_))
        ));
        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);

        // Absent ids are fine and stay absent
        session.user.id = None;
        store.save(&session).unwrap();
        assert_eq!(store.load().into_session().unwrap().user.id, None);
    }

    #[test]
    fn test_absent_entry_is_empty() {
        let (_, store) = memory_store();
        assert_eq!(store.load(), LoadResult::Empty);
    }

    #[test]
    fn test_clear_removes_entry() {
        let (storage, store) = memory_store();
        store.save(&sample_session(Role::Customer)).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), LoadResult::Empty);
        assert_eq!(storage.get(SESSION_KEY).unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_malformed_entries_are_corrupt() {
        let (storage, store) = memory_store();
        for raw in [
            "{",
            "[]",
            "42",
            "\"token\"",
            r#"{"name": "A", "role": "admin"}"#,
            r#"{"name": "A", "token": "", "tokenIssuedAt": "2024-01-01T00:00:00Z"}"#,
            r#"{"name": "A", "token": "t", "tokenIssuedAt": "yesterday"}"#,
        ] {
            storage.set(SESSION_KEY, raw).unwrap();
            assert!(store.load().is_corrupt(), "expected corrupt for {raw}");
        }
    }

    #[test]
    fn test_stored_null_is_empty() {
        let (storage, store) = memory_store();
        storage.set(SESSION_KEY, "null").unwrap();
        assert_eq!(store.load(), LoadResult::Empty);
    }

    #[test]
    fn test_unreadable_storage_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = TokenStore::new(Arc::new(FileStorage::new(&path)));
        assert!(store.load().is_corrupt());

        // Saving repairs the file
        let session = sample_session(Role::Admin);
        store.save(&session).unwrap();
        assert_eq!(store.load(), LoadResult::Loaded(session));
    }

    #[test]
    fn test_file_backed_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let session = sample_session(Role::Customer);

        TokenStore::new(Arc::new(FileStorage::new(&path)))
            .save(&session)
            .unwrap();
        let reopened = TokenStore::new(Arc::new(FileStorage::new(&path)));
        assert_eq!(reopened.load(), LoadResult::Loaded(session));
    }

    fn role_strategy() -> impl Strategy<Value = Role> {
        prop_oneof![Just(Role::Admin), Just(Role::Vendor), Just(Role::Customer)]
    }

    proptest! {
        #[test]
        fn prop_save_load_round_trip(
            id in proptest::option::of("[a-f0-9]{1,24}"),
            name in "[A-Za-z ]{0,30}",
            email in proptest::option::of("[a-z]{3,10}@[a-z]{3,10}\\.(com|org|np)"),
            role in role_strategy(),
            token in "[A-Za-z0-9._-]{1,64}",
            issued in 0i64..4_000_000_000,
        ) {
            let (_, store) = memory_store();
            let session = Session {
                user: User { id, name, email, role, phone: None },
                token,
                token_issued_at: Utc.timestamp_opt(issued, 0).unwrap(),
                token_expires_at: None,
            };
            store.save(&session).unwrap();
            prop_assert_eq!(store.load(), LoadResult::Loaded(session));
        }

        #[test]
        fn prop_arbitrary_stored_text_never_loads_without_token(raw in ".{0,200}") {
            let (storage, store) = memory_store();
            storage.set(SESSION_KEY, &raw).unwrap();
            match store.load() {
                LoadResult::Loaded(session) => prop_assert!(!session.token.trim().is_empty()),
                LoadResult::Empty | LoadResult::Corrupt(_) => {}
            }
        }
    }
}
