//! Persistence for finished sessions.
//!
//! The timer core only needs two operations from a store: durably write a
//! finished session and list every session belonging to a user. Writes are
//! keyed by session id, so saving the same record twice is harmless.
//!
//! - [`JsonSessionStore`] keeps all records in one JSON document on disk
//! - [`MockSessionStore`] keeps them in memory and can be told to fail

pub(crate) mod atomic;
pub mod error;
pub mod json;

pub use error::StoreError;
pub use json::JsonSessionStore;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::types::SessionRecord;

#[allow(async_fn_in_trait)]
pub trait SessionStore {
    /// Writes `record`, replacing any record with the same id.
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Returns every record whose `user_id` matches.
    async fn get_user_sessions(&self, user_id: &str) -> Result<Vec<SessionRecord>, StoreError>;
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MockSessionStore {
    records: Mutex<Vec<SessionRecord>>,
    save_calls: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockSessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with [`StoreError::Unavailable`].
    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    /// Number of `save_session` calls, including failed ones.
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Copy of every stored record.
    pub fn records(&self) -> Vec<SessionRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("mock failure".to_string()));
        }
        Ok(())
    }
}

impl SessionStore for MockSessionStore {
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("poisoned".to_string()))?;
        records.retain(|r| r.id != record.id);
        records.push(record.clone());
        Ok(())
    }

    async fn get_user_sessions(&self, user_id: &str) -> Result<Vec<SessionRecord>, StoreError> {
        self.check_available()?;

        let records = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("poisoned".to_string()))?;
        Ok(records
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}
