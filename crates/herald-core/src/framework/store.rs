//! In-memory per-user state.
//!
//! The [`StateStore`] is the only shared mutable resource in the core. It is
//! constructed once at process start and passed by handle to every component
//! that needs it; nothing reaches it through ambient global lookup. State is
//! entirely volatile and lost on restart.
//!
//! # Concurrency
//!
//! Every operation takes the lock for exactly one critical section and
//! releases it before returning; no caller can hold it across a suspension
//! point. Reads hand out cloned records, so a partially-written record is
//! never observable.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::foundation::event::UserId;

/// A small per-user record tracked for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Unique key.
    pub user_id: UserId,
    /// Display name captured when the record was created.
    pub display_name: String,
    /// Join time as unix seconds.
    pub joined_at: i64,
    /// Messages observed from this user since the record was created.
    pub message_count: u64,
}

/// An in-memory mapping from user id to [`UserRecord`].
#[derive(Debug, Default)]
pub struct StateStore {
    records: RwLock<HashMap<UserId, UserRecord>>,
}

impl StateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or resets the record for a user.
    ///
    /// A pre-existing record is replaced wholesale, which puts the message
    /// count back to zero for users who leave and rejoin.
    pub fn upsert(&self, user_id: UserId, display_name: impl Into<String>, joined_at: i64) {
        let record = UserRecord {
            user_id: user_id.clone(),
            display_name: display_name.into(),
            joined_at,
            message_count: 0,
        };
        self.records.write().insert(user_id, record);
    }

    /// Bumps the message count for a tracked user.
    ///
    /// Silently does nothing when the user has no record; a record is only
    /// ever created by [`upsert`](Self::upsert).
    pub fn increment_message_count(&self, user_id: &UserId) {
        if let Some(record) = self.records.write().get_mut(user_id) {
            record.message_count += 1;
        }
    }

    /// Returns a copy of the record for a user, if tracked.
    pub fn get(&self, user_id: &UserId) -> Option<UserRecord> {
        self.records.read().get(user_id).cloned()
    }

    /// Number of tracked records.
    pub fn count(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store is tracking no one.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_upsert_then_get_round_trips() {
        let store = StateStore::new();
        store.upsert(UserId::from("u1"), "Ada", 1_700_000_000);

        let record = store.get(&UserId::from("u1")).unwrap();
        assert_eq!(record.display_name, "Ada");
        assert_eq!(record.joined_at, 1_700_000_000);
        assert_eq!(record.message_count, 0);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_increment_unknown_user_is_a_noop() {
        let store = StateStore::new();
        store.increment_message_count(&UserId::from("ghost"));

        assert!(store.get(&UserId::from("ghost")).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_increment_tracked_user() {
        let store = StateStore::new();
        store.upsert(UserId::from("u1"), "Ada", 0);
        store.increment_message_count(&UserId::from("u1"));
        store.increment_message_count(&UserId::from("u1"));

        assert_eq!(store.get(&UserId::from("u1")).unwrap().message_count, 2);
    }

    #[test]
    fn test_rejoin_resets_the_record() {
        let store = StateStore::new();
        store.upsert(UserId::from("u1"), "Ada", 100);
        store.increment_message_count(&UserId::from("u1"));

        store.upsert(UserId::from("u1"), "Ada L.", 200);

        let record = store.get(&UserId::from("u1")).unwrap();
        assert_eq!(record.display_name, "Ada L.");
        assert_eq!(record.joined_at, 200);
        assert_eq!(record.message_count, 0);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_concurrent_upserts_keep_every_record() {
        let store = Arc::new(StateStore::new());
        let threads = 32;

        std::thread::scope(|scope| {
            for i in 0..threads {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    store.upsert(UserId::new(format!("user-{i}")), format!("name-{i}"), i as i64);
                });
            }
        });

        assert_eq!(store.count(), threads);
        for i in 0..threads {
            let record = store.get(&UserId::new(format!("user-{i}"))).unwrap();
            assert_eq!(record.display_name, format!("name-{i}"));
        }
    }
}
