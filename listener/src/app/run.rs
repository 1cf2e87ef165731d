//! Single-shot listener run

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::app::options::RunOptions;
use crate::deploy::tracker::{DeploymentStateTracker, IntentSink};
use crate::errors::ListenerError;
use crate::models::notification::{Notification, NotificationIntent};
use crate::notify::Notifier;
use crate::source::DeploymentSource;
use crate::state::StateStore;

/// Outcome of a successful run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub apps_checked: usize,
    pub notifications_sent: usize,
}

/// Wires a deployment source, a state store and a notifier together.
/// One instance per invocation.
pub struct Listener {
    source: Arc<dyn DeploymentSource>,
    tracker: DeploymentStateTracker<Arc<dyn StateStore>>,
    notifier: Arc<dyn Notifier>,
    fail_fast: bool,
}

impl Listener {
    pub fn new(
        source: Arc<dyn DeploymentSource>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn Notifier>,
        options: RunOptions,
    ) -> Self {
        Self {
            source,
            tracker: DeploymentStateTracker::new(store, options.fsm_settings),
            notifier,
            fail_fast: options.fail_fast,
        }
    }

    /// Check every application once, using the current time
    pub async fn run_once(&self, app_ids: &[String]) -> Result<RunSummary, ListenerError> {
        self.run_once_at(app_ids, Utc::now()).await
    }

    /// Check every application once as of `now`
    pub async fn run_once_at(
        &self,
        app_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<RunSummary, ListenerError> {
        info!("Checking {} application(s)...", app_ids.len());

        let mut summary = RunSummary::default();
        let mut failed = 0;

        for app_id in app_ids {
            match self.check_app(app_id, now).await {
                Ok(sent) => {
                    summary.apps_checked += 1;
                    summary.notifications_sent += sent;
                }
                Err(e) if self.fail_fast => {
                    error!("Checking app {} failed, aborting run: {}", app_id, e);
                    return Err(e);
                }
                Err(e) => {
                    error!("Checking app {} failed: {}", app_id, e);
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(ListenerError::RunFailed {
                failed,
                total: app_ids.len(),
            });
        }

        info!(
            "Run complete: {} application(s), {} notification(s)",
            summary.apps_checked, summary.notifications_sent
        );
        Ok(summary)
    }

    /// Check one application, returning how many notifications were sent
    pub async fn check_app(&self, app_id: &str, now: DateTime<Utc>) -> Result<usize, ListenerError> {
        let deployments = self.source.list_deployments(app_id).await?;
        if deployments.is_empty() {
            debug!("App {} has no deployments", app_id);
            return Ok(0);
        }

        let announcer = Announcer {
            source: self.source.as_ref(),
            notifier: self.notifier.as_ref(),
        };
        let intents = self.tracker.evaluate(deployments, now, &announcer).await?;
        Ok(intents.len())
    }
}

/// Turns a committed intent into a chat notification
struct Announcer<'a> {
    source: &'a dyn DeploymentSource,
    notifier: &'a dyn Notifier,
}

#[async_trait]
impl<'a> IntentSink for Announcer<'a> {
    async fn deliver(&self, intent: &NotificationIntent) -> Result<(), ListenerError> {
        let stack_name = self.source.stack_name(&intent.deployment.stack_id).await?;
        let notification = Notification::from_intent(intent, stack_name);
        self.notifier.notify(&notification).await
    }
}
