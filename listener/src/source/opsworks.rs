//! OpsWorks deployment source

use async_trait::async_trait;
use aws_sdk_opsworks::error::ProvideErrorMetadata;
use aws_sdk_opsworks::types::Deployment;
use aws_sdk_opsworks::Client;
use tracing::debug;

use crate::errors::ListenerError;
use crate::models::deployment::{parse_timestamp, DeploymentRecord, DeploymentStatus};
use crate::source::DeploymentSource;

/// The OpsWorks API is only served from us-east-1
pub const DEFAULT_REGION: &str = "us-east-1";

/// Lists deployments through the OpsWorks API
pub struct OpsWorksSource {
    client: Client,
}

impl OpsWorksSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn upstream<E: ProvideErrorMetadata + std::fmt::Display>(action: &str, err: E) -> ListenerError {
    ListenerError::UpstreamListing(format!(
        "{} failed ({}): {}",
        action,
        err.code().unwrap_or("unknown"),
        err.message().map(str::to_string).unwrap_or_else(|| err.to_string())
    ))
}

/// Convert an SDK deployment. A missing ID or creation time fails the listing;
/// an unparseable completion time is treated as absent.
pub fn record_from_sdk(deployment: &Deployment) -> Result<DeploymentRecord, ListenerError> {
    let id = deployment
        .deployment_id()
        .ok_or_else(|| ListenerError::UpstreamListing("deployment without DeploymentId".to_string()))?;

    let created_at = deployment
        .created_at()
        .and_then(parse_timestamp)
        .ok_or_else(|| {
            ListenerError::UpstreamListing(format!(
                "deployment {} has invalid CreatedAt: {:?}",
                id,
                deployment.created_at()
            ))
        })?;

    Ok(DeploymentRecord {
        id: id.to_string(),
        stack_id: deployment.stack_id().unwrap_or_default().to_string(),
        app_id: deployment.app_id().map(str::to_string),
        status: DeploymentStatus::from_wire(deployment.status().unwrap_or_default()),
        created_at,
        completed_at: deployment.completed_at().and_then(parse_timestamp),
    })
}

#[async_trait]
impl DeploymentSource for OpsWorksSource {
    async fn list_deployments(&self, app_id: &str) -> Result<Vec<DeploymentRecord>, ListenerError> {
        let response = self
            .client
            .describe_deployments()
            .app_id(app_id)
            .send()
            .await
            .map_err(|e| upstream("DescribeDeployments", e))?;

        let deployments = response.deployments();
        debug!("App {} has {} deployment(s)", app_id, deployments.len());

        deployments.iter().map(record_from_sdk).collect()
    }

    async fn stack_name(&self, stack_id: &str) -> Result<String, ListenerError> {
        let response = self
            .client
            .describe_stacks()
            .stack_ids(stack_id)
            .send()
            .await
            .map_err(|e| upstream("DescribeStacks", e))?;

        Ok(response
            .stacks()
            .first()
            .and_then(|stack| stack.name())
            .map(str::to_string)
            .unwrap_or_else(|| stack_id.to_string()))
    }
}
