//! Notification models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::deployment::DeploymentRecord;

/// Which lifecycle transition a notification announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Started,
    Succeeded,
    Failed,
}

impl NotificationKind {
    /// Chat attachment colour
    pub fn color(&self) -> &'static str {
        match self {
            NotificationKind::Started => "warning",
            NotificationKind::Succeeded => "good",
            NotificationKind::Failed => "danger",
        }
    }
}

/// Decision produced by the tracker: announce `kind` for `deployment`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    pub kind: NotificationKind,
    pub deployment: DeploymentRecord,
}

impl NotificationIntent {
    pub fn new(kind: NotificationKind, deployment: DeploymentRecord) -> Self {
        Self { kind, deployment }
    }

    pub fn deployment_id(&self) -> &str {
        &self.deployment.id
    }
}

/// What the notification sink receives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,

    /// Human readable stack name (falls back to the stack ID)
    pub stack_name: String,

    pub created_at: DateTime<Utc>,

    pub completed_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn from_intent(intent: &NotificationIntent, stack_name: String) -> Self {
        Self {
            kind: intent.kind,
            stack_name,
            created_at: intent.deployment.created_at,
            completed_at: intent.deployment.completed_at,
        }
    }
}
