//! Tracked deployment state
//!
//! One entry per deployment that has been announced as started and has not
//! yet been announced as finished. The value is the deployment's creation
//! time.

pub mod dynamodb;
pub mod file;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::ListenerError;

/// Key-value store keyed by deployment ID
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Creation time recorded for `deployment_id`, if tracked
    async fn get(&self, deployment_id: &str) -> Result<Option<DateTime<Utc>>, ListenerError>;

    /// Start tracking `deployment_id`
    async fn put(&self, deployment_id: &str, created_at: DateTime<Utc>)
        -> Result<(), ListenerError>;

    /// Stop tracking `deployment_id`. Deleting an absent key is not an error.
    async fn delete(&self, deployment_id: &str) -> Result<(), ListenerError>;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    async fn get(&self, deployment_id: &str) -> Result<Option<DateTime<Utc>>, ListenerError> {
        (**self).get(deployment_id).await
    }

    async fn put(
        &self,
        deployment_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), ListenerError> {
        (**self).put(deployment_id, created_at).await
    }

    async fn delete(&self, deployment_id: &str) -> Result<(), ListenerError> {
        (**self).delete(deployment_id).await
    }
}
