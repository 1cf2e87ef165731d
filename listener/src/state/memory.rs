//! In-memory state store

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::ListenerError;
use crate::state::StateStore;

/// Process-local store, used for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with entries
    pub fn with_entries(entries: impl IntoIterator<Item = (String, DateTime<Utc>)>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }

    /// Copy of all tracked entries
    pub fn snapshot(&self) -> HashMap<String, DateTime<Utc>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.clone()
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, deployment_id: &str) -> Result<Option<DateTime<Utc>>, ListenerError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(deployment_id).copied())
    }

    async fn put(
        &self,
        deployment_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), ListenerError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(deployment_id.to_string(), created_at);
        Ok(())
    }

    async fn delete(&self, deployment_id: &str) -> Result<(), ListenerError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(deployment_id);
        Ok(())
    }
}
