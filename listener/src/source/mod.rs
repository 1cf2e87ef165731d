//! Deployment listing

pub mod opsworks;

use async_trait::async_trait;

use crate::errors::ListenerError;
use crate::models::deployment::DeploymentRecord;

/// Upstream service that knows about deployments and stacks
#[async_trait]
pub trait DeploymentSource: Send + Sync {
    /// Current deployments of an application, in any order
    async fn list_deployments(&self, app_id: &str) -> Result<Vec<DeploymentRecord>, ListenerError>;

    /// Display name of a stack; the stack ID itself when the stack is unknown
    async fn stack_name(&self, stack_id: &str) -> Result<String, ListenerError>;
}
