//! Deduplicating deployment state tracker

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::deploy::fsm::{transition, FsmSettings, TrackedState, Transition};
use crate::errors::ListenerError;
use crate::models::deployment::DeploymentRecord;
use crate::models::notification::{NotificationIntent, NotificationKind};
use crate::state::StateStore;

/// Receives each intent right after its state change has been stored
#[async_trait]
pub trait IntentSink: Send + Sync {
    async fn deliver(&self, intent: &NotificationIntent) -> Result<(), ListenerError>;
}

/// Decides which deployments deserve a notification and keeps the store in
/// step with what has been announced.
pub struct DeploymentStateTracker<S> {
    store: S,
    settings: FsmSettings,
}

impl<S: StateStore> DeploymentStateTracker<S> {
    pub fn new(store: S, settings: FsmSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether `deployment` is young enough to be evaluated at `now`
    pub fn is_fresh(&self, deployment: &DeploymentRecord, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(deployment.created_at);
        let window = i64::try_from(self.settings.freshness_window.as_millis()).unwrap_or(i64::MAX);
        age.num_milliseconds() <= window
    }

    /// Evaluate the current deployments of one application, most recent first.
    ///
    /// Each deployment is finished before the next is read: its state change
    /// is stored, then its intent goes to `sink`. A store failure stops the
    /// evaluation; everything stored before it has already been delivered.
    /// A delivery failure loses only that intent. The remaining deployments
    /// are still processed and the first delivery error is returned at the
    /// end.
    ///
    /// On success returns every emitted intent in delivery order.
    pub async fn evaluate<K>(
        &self,
        mut deployments: Vec<DeploymentRecord>,
        now: DateTime<Utc>,
        sink: &K,
    ) -> Result<Vec<NotificationIntent>, ListenerError>
    where
        K: IntentSink + ?Sized,
    {
        // sort_by is stable
        deployments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let mut intents = Vec::new();
        let mut delivery_error = None;

        for deployment in deployments {
            let Some(intent) = self.advance(deployment, now).await? else {
                continue;
            };

            if let Err(e) = sink.deliver(&intent).await {
                warn!(
                    "Notification for deployment {} lost: {}",
                    intent.deployment_id(),
                    e
                );
                if delivery_error.is_none() {
                    delivery_error = Some(e);
                }
            }
            intents.push(intent);
        }

        match delivery_error {
            Some(e) => Err(e),
            None => Ok(intents),
        }
    }

    /// Apply one deployment to the store, returning the intent it produced
    pub async fn advance(
        &self,
        deployment: DeploymentRecord,
        now: DateTime<Utc>,
    ) -> Result<Option<NotificationIntent>, ListenerError> {
        if !self.is_fresh(&deployment, now) {
            debug!(
                "Skipping stale deployment {} (created {})",
                deployment.id, deployment.created_at
            );
            return Ok(None);
        }

        let tracked = self.store.get(&deployment.id).await?;
        let state = TrackedState::from_presence(tracked.is_some());

        match transition(&deployment.status, state) {
            Transition::Ignore => {
                debug!(
                    "No change for deployment {} ({}, {:?})",
                    deployment.id, deployment.status, state
                );
                Ok(None)
            }
            Transition::Start => {
                self.store.put(&deployment.id, deployment.created_at).await?;
                info!("Deployment {} started", deployment.id);
                Ok(Some(NotificationIntent::new(NotificationKind::Started, deployment)))
            }
            Transition::Finish(kind) => {
                self.store.delete(&deployment.id).await?;
                info!("Deployment {} finished: {}", deployment.id, deployment.status);
                Ok(Some(NotificationIntent::new(kind, deployment)))
            }
        }
    }
}
