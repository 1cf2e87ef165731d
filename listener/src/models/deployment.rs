//! Deployment models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a deployment as reported upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    /// Deployment in progress
    Running,

    /// Deployment finished successfully
    Successful,

    /// Any other terminal value ("failed", "stopped", ...), kept verbatim
    OtherTerminal(String),
}

impl DeploymentStatus {
    /// Map the raw upstream status string
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "running" => DeploymentStatus::Running,
            "successful" => DeploymentStatus::Successful,
            other => DeploymentStatus::OtherTerminal(other.to_string()),
        }
    }
}

impl std::fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeploymentStatus::Running => f.write_str("running"),
            DeploymentStatus::Successful => f.write_str("successful"),
            DeploymentStatus::OtherTerminal(raw) => f.write_str(raw),
        }
    }
}

/// A deployment as seen by the listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Unique deployment ID
    pub id: String,

    /// Stack this deployment targets
    pub stack_id: String,

    /// Application this deployment belongs to
    #[serde(default)]
    pub app_id: Option<String>,

    /// Current status
    pub status: DeploymentStatus,

    /// When the deployment was created
    pub created_at: DateTime<Utc>,

    /// When the deployment reached a terminal status
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Parse an upstream RFC 3339 timestamp (e.g. `2024-05-01T12:00:00+00:00`)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a timestamp the way upstream does
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
}
