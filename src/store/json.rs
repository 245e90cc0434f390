//! File-backed JSON session store.
//!
//! All records live in a single document shaped like
//! `{ "sessions": { "<id>": { ...record } } }`. Every save reads the
//! document, upserts the record and writes the whole document back through a
//! synced temporary file that is renamed over the original.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::atomic::write_atomic;
use super::{SessionStore, StoreError};
use crate::types::SessionRecord;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Document {
    #[serde(default)]
    sessions: BTreeMap<String, SessionRecord>,
}

/// Session store persisted as a JSON document.
#[derive(Debug)]
pub struct JsonSessionStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl JsonSessionStore {
    /// Creates a store backed by `path`. The file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Document, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Document::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Document::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, document: &Document) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(document)?;
        write_atomic(&self.path, &json).await?;
        Ok(())
    }
}

impl SessionStore for JsonSessionStore {
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load().await?;
        document.sessions.insert(record.id.clone(), record.clone());
        self.write(&document).await?;

        tracing::debug!(session_id = %record.id, path = ?self.path, "session saved");
        Ok(())
    }

    async fn get_user_sessions(&self, user_id: &str) -> Result<Vec<SessionRecord>, StoreError> {
        let document = self.load().await?;
        Ok(document
            .sessions
            .into_values()
            .filter(|r| r.user_id == user_id)
            .collect())
    }
}
