use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;

use deploy_listener::deploy::fsm::FsmSettings;
use deploy_listener::deploy::tracker::DeploymentStateTracker;
use deploy_listener::errors::ListenerError;
use deploy_listener::models::deployment::DeploymentStatus;
use deploy_listener::models::notification::NotificationKind;
use deploy_listener::state::memory::MemoryStateStore;
use deploy_listener::state::StateStore;

use crate::support::{deployment, failed, now, CountingStore, RecordingSink};

fn tracker<S: StateStore>(store: S) -> DeploymentStateTracker<S> {
    DeploymentStateTracker::new(store, FsmSettings::default())
}

#[tokio::test]
async fn test_started_then_succeeded() {
    let tracker = tracker(MemoryStateStore::new());
    let created = now() - Duration::minutes(1);

    let intents = tracker
        .evaluate(vec![deployment("d1", DeploymentStatus::Running, created)], now(), &RecordingSink::new())
        .await
        .unwrap();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].kind, NotificationKind::Started);
    assert_eq!(tracker.store().snapshot().get("d1"), Some(&created));

    let intents = tracker
        .evaluate(vec![deployment("d1", DeploymentStatus::Successful, created)], now(), &RecordingSink::new())
        .await
        .unwrap();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].kind, NotificationKind::Succeeded);
    assert!(tracker.store().is_empty());
}

#[tokio::test]
async fn test_repoll_while_running_is_silent() {
    let tracker = tracker(Arc::new(CountingStore::new()));
    let listing = vec![deployment("d1", DeploymentStatus::Running, now() - Duration::minutes(5))];

    let first = tracker.evaluate(listing.clone(), now(), &RecordingSink::new()).await.unwrap();
    assert_eq!(first.len(), 1);

    let second = tracker.evaluate(listing, now(), &RecordingSink::new()).await.unwrap();
    assert!(second.is_empty());
    assert_eq!(tracker.store().mutations(), 1);
}

#[tokio::test]
async fn test_stale_deployments_never_touch_the_store() {
    let tracker = tracker(Arc::new(CountingStore::new()));
    let listing = vec![
        deployment("old-running", DeploymentStatus::Running, now() - Duration::hours(2)),
        deployment("old-failed", failed(), now() - Duration::hours(3)),
    ];

    let intents = tracker.evaluate(listing, now(), &RecordingSink::new()).await.unwrap();
    assert!(intents.is_empty());
    assert_eq!(tracker.store().calls(), 0);
}

#[tokio::test]
async fn test_window_boundary() {
    let tracker = tracker(MemoryStateStore::new());
    let listing = vec![
        deployment("edge", DeploymentStatus::Running, now() - Duration::seconds(3600)),
        deployment("past", DeploymentStatus::Running, now() - Duration::seconds(3601)),
    ];

    let intents = tracker.evaluate(listing, now(), &RecordingSink::new()).await.unwrap();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].deployment_id(), "edge");
    assert_eq!(tracker.store().len(), 1);
}

#[tokio::test]
async fn test_terminal_without_start_is_ignored() {
    let tracker = tracker(Arc::new(CountingStore::new()));
    let listing = vec![
        deployment("d1", DeploymentStatus::Successful, now() - Duration::minutes(10)),
        deployment("d2", failed(), now() - Duration::minutes(20)),
    ];

    let intents = tracker.evaluate(listing, now(), &RecordingSink::new()).await.unwrap();
    assert!(intents.is_empty());
    assert_eq!(tracker.store().mutations(), 0);
    assert!(tracker.store().inner.is_empty());
}

#[tokio::test]
async fn test_deployment_seen_across_ticks() {
    let tracker = tracker(MemoryStateStore::new());
    let t = now();

    let intents = tracker
        .evaluate(vec![deployment("d1", DeploymentStatus::Running, t)], t, &RecordingSink::new())
        .await
        .unwrap();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].kind, NotificationKind::Started);
    assert_eq!(intents[0].deployment_id(), "d1");
    assert_eq!(tracker.store().snapshot(), HashMap::from([("d1".to_string(), t)]));

    let mut finished = deployment("d1", DeploymentStatus::Successful, t);
    finished.completed_at = Some(t + Duration::seconds(300));
    let intents = tracker
        .evaluate(vec![finished], t + Duration::seconds(300), &RecordingSink::new())
        .await
        .unwrap();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].kind, NotificationKind::Succeeded);
    assert_eq!(
        intents[0].deployment.completed_at,
        Some(t + Duration::seconds(300))
    );
    assert!(tracker.store().is_empty());
}

#[tokio::test]
async fn test_failed_deployment_reports_failure() {
    let created = now() - Duration::minutes(3);
    let store = MemoryStateStore::with_entries([("d1".to_string(), created)]);
    let tracker = tracker(store);

    let intents = tracker
        .evaluate(vec![deployment("d1", failed(), created)], now(), &RecordingSink::new())
        .await
        .unwrap();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].kind, NotificationKind::Failed);
    assert!(tracker.store().is_empty());
}

#[tokio::test]
async fn test_equal_creation_times_keep_listing_order() {
    let tracker = tracker(MemoryStateStore::new());
    let created = now() - Duration::minutes(5);
    let listing = vec![
        deployment("first", DeploymentStatus::Running, created),
        deployment("second", DeploymentStatus::Running, created),
        deployment("newer", DeploymentStatus::Running, now()),
    ];

    let intents = tracker.evaluate(listing, now(), &RecordingSink::new()).await.unwrap();
    let ids: Vec<&str> = intents.iter().map(|i| i.deployment_id()).collect();
    assert_eq!(ids, vec!["newer", "first", "second"]);
}

#[tokio::test]
async fn test_store_failure_yields_no_intents() {
    let tracker = tracker(Arc::new(CountingStore::failing()));
    let listing = vec![deployment("d1", DeploymentStatus::Running, now())];

    let result = tracker.evaluate(listing, now(), &RecordingSink::new()).await;
    assert!(result.is_err());
    assert_eq!(tracker.store().mutations(), 0);
}

#[tokio::test]
async fn test_store_failure_mid_batch_keeps_earlier_deliveries() {
    let tracker = tracker(Arc::new(CountingStore::failing_put(2)));
    let sink = RecordingSink::new();
    let listing = vec![
        deployment("d2", DeploymentStatus::Running, now() - Duration::minutes(10)),
        deployment("d1", DeploymentStatus::Running, now() - Duration::minutes(1)),
    ];

    let result = tracker.evaluate(listing, now(), &sink).await;
    assert!(matches!(result, Err(ListenerError::StateStore(_))));

    // d1 was stored and delivered before d2's write failed
    assert_eq!(sink.delivered(), vec!["d1"]);
    let tracked: Vec<String> = tracker.store().inner.snapshot().into_keys().collect();
    assert_eq!(tracked, vec!["d1"]);
}

#[tokio::test]
async fn test_every_tracked_deployment_was_delivered() {
    let tracker = tracker(Arc::new(CountingStore::failing_put(2)));
    let sink = RecordingSink::new();
    let listing = vec![
        deployment("d1", DeploymentStatus::Running, now() - Duration::minutes(1)),
        deployment("d2", DeploymentStatus::Running, now() - Duration::minutes(10)),
    ];

    assert!(tracker.evaluate(listing.clone(), now(), &sink).await.is_err());
    let intents = tracker.evaluate(listing, now(), &sink).await.unwrap();
    assert_eq!(intents.len(), 1);
    assert_eq!(intents[0].deployment_id(), "d2");

    let mut tracked: Vec<String> = tracker.store().inner.snapshot().into_keys().collect();
    tracked.sort();
    let mut delivered = sink.delivered();
    delivered.sort();
    assert_eq!(tracked, delivered);
}
