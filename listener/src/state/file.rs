//! JSON file state store
//!
//! The whole map lives in one file, `{ "<deployment id>": "<created at>" }`,
//! and is rewritten on every mutation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::ListenerError;
use crate::filesys::file::File;
use crate::state::StateStore;

type Entries = BTreeMap<String, DateTime<Utc>>;

/// Tracked state kept in a local JSON file
pub struct FileStateStore {
    file: File,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStateStore {
    pub fn new(file: File) -> Self {
        Self {
            file,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Entries, ListenerError> {
        if !self.file.exists().await {
            return Ok(Entries::new());
        }
        self.file
            .read_json()
            .await
            .map_err(|e| ListenerError::StateStore(format!("{}: {}", self.file.path().display(), e)))
    }

    async fn save(&self, entries: &Entries) -> Result<(), ListenerError> {
        self.file
            .write_json(entries)
            .await
            .map_err(|e| ListenerError::StateStore(format!("{}: {}", self.file.path().display(), e)))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn get(&self, deployment_id: &str) -> Result<Option<DateTime<Utc>>, ListenerError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.get(deployment_id).copied())
    }

    async fn put(
        &self,
        deployment_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), ListenerError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(deployment_id.to_string(), created_at);
        self.save(&entries).await?;
        debug!("Tracked {} in {}", deployment_id, self.file.path().display());
        Ok(())
    }

    async fn delete(&self, deployment_id: &str) -> Result<(), ListenerError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(deployment_id).is_some() {
            self.save(&entries).await?;
            debug!("Untracked {} in {}", deployment_id, self.file.path().display());
        }
        Ok(())
    }
}
