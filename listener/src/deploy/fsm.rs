//! Per-deployment notification state machine
//!
//! ```text
//! Unseen --[running]--------------------> Started   (notify started)
//! Started --[running]-------------------> Started   (no-op)
//! Started --[successful]----------------> Unseen    (notify succeeded)
//! Started --[any other terminal status]-> Unseen    (notify failed)
//! Unseen --[terminal]-------------------> Unseen    (no-op)
//! ```

use std::time::Duration;

use crate::models::deployment::DeploymentStatus;
use crate::models::notification::NotificationKind;

/// Tracker settings
#[derive(Debug, Clone)]
pub struct FsmSettings {
    /// Deployments created longer ago than this are ignored entirely.
    /// The bound is exclusive: an age equal to the window is still evaluated.
    pub freshness_window: Duration,
}

impl Default for FsmSettings {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_secs(3600),
        }
    }
}

/// Whether the store currently holds an entry for a deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedState {
    /// No entry: never announced, or already closed
    Unseen,

    /// Entry present: "started" was announced, no terminal yet
    Started,
}

impl TrackedState {
    pub fn from_presence(present: bool) -> Self {
        if present {
            TrackedState::Started
        } else {
            TrackedState::Unseen
        }
    }
}

/// What to do for one deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Leave the store alone and stay quiet
    Ignore,

    /// Record the deployment and announce it started
    Start,

    /// Forget the deployment and announce its outcome
    Finish(NotificationKind),
}

/// Decide the transition for a deployment's reported status
pub fn transition(status: &DeploymentStatus, state: TrackedState) -> Transition {
    match (state, status) {
        (TrackedState::Unseen, DeploymentStatus::Running) => Transition::Start,
        (TrackedState::Started, DeploymentStatus::Running) => Transition::Ignore,

        (TrackedState::Started, DeploymentStatus::Successful) => {
            Transition::Finish(NotificationKind::Succeeded)
        }
        (TrackedState::Started, DeploymentStatus::OtherTerminal(_)) => {
            Transition::Finish(NotificationKind::Failed)
        }

        // Finished without us ever announcing the start
        (TrackedState::Unseen, _) => Transition::Ignore,
    }
}
