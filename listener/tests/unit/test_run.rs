use std::sync::Arc;

use chrono::Duration;
use tokio_test::{assert_err, assert_ok};

use deploy_listener::app::options::RunOptions;
use deploy_listener::app::run::Listener;
use deploy_listener::errors::ListenerError;
use deploy_listener::models::deployment::DeploymentStatus;
use deploy_listener::models::notification::NotificationKind;
use deploy_listener::state::memory::MemoryStateStore;

use crate::support::{deployment, now, CountingStore, FakeSource, RecordingNotifier};

fn apps(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

fn listener(
    source: &Arc<FakeSource>,
    store: &Arc<MemoryStateStore>,
    notifier: &Arc<RecordingNotifier>,
    fail_fast: bool,
) -> Listener {
    Listener::new(
        source.clone(),
        store.clone(),
        notifier.clone(),
        RunOptions {
            fail_fast,
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_lifecycle_across_runs() {
    let created = now() - Duration::minutes(2);
    let source = Arc::new(
        FakeSource::new()
            .with_listing("app", vec![deployment("d1", DeploymentStatus::Running, created)])
            .with_stack_name("stack-d1", "production"),
    );
    let store = Arc::new(MemoryStateStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let listener = listener(&source, &store, &notifier, false);

    let summary = assert_ok!(listener.run_once_at(&apps(&["app"]), now()).await);
    assert_eq!(summary.apps_checked, 1);
    assert_eq!(summary.notifications_sent, 1);

    // Still running: nothing new
    let summary = assert_ok!(listener.run_once_at(&apps(&["app"]), now()).await);
    assert_eq!(summary.notifications_sent, 0);

    let mut done = deployment("d1", DeploymentStatus::Successful, created);
    done.completed_at = Some(now() + Duration::minutes(1));
    source.set_listing("app", vec![done]);
    let later = now() + Duration::minutes(5);
    let summary = assert_ok!(listener.run_once_at(&apps(&["app"]), later).await);
    assert_eq!(summary.notifications_sent, 1);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].kind, NotificationKind::Started);
    assert_eq!(sent[0].stack_name, "production");
    assert_eq!(sent[1].kind, NotificationKind::Succeeded);
    assert_eq!(sent[1].completed_at, Some(now() + Duration::minutes(1)));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_failing_app_does_not_stop_the_run() {
    let source = Arc::new(
        FakeSource::new()
            .with_failing_app("broken")
            .with_listing("ok", vec![deployment("d1", DeploymentStatus::Running, now())]),
    );
    let store = Arc::new(MemoryStateStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let listener = listener(&source, &store, &notifier, false);

    let err = assert_err!(listener.run_once_at(&apps(&["broken", "ok"]), now()).await);
    assert!(matches!(err, ListenerError::RunFailed { failed: 1, total: 2 }));
    assert_eq!(source.listed(), apps(&["broken", "ok"]));
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_fail_fast_stops_at_first_error() {
    let source = Arc::new(
        FakeSource::new()
            .with_failing_app("broken")
            .with_listing("ok", vec![deployment("d1", DeploymentStatus::Running, now())]),
    );
    let store = Arc::new(MemoryStateStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let listener = listener(&source, &store, &notifier, true);

    let err = assert_err!(listener.run_once_at(&apps(&["broken", "ok"]), now()).await);
    assert!(matches!(err, ListenerError::UpstreamListing(_)));
    assert_eq!(source.listed(), apps(&["broken"]));
    assert!(notifier.sent().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_stack_id_used_when_name_unknown() {
    let source = Arc::new(
        FakeSource::new()
            .with_listing("app", vec![deployment("d1", DeploymentStatus::Running, now())]),
    );
    let store = Arc::new(MemoryStateStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let listener = listener(&source, &store, &notifier, false);

    assert_ok!(listener.run_once_at(&apps(&["app"]), now()).await);
    assert_eq!(notifier.sent()[0].stack_name, "stack-d1");
}

#[tokio::test]
async fn test_notifier_error_is_not_retried() {
    let source = Arc::new(
        FakeSource::new()
            .with_listing("app", vec![deployment("d1", DeploymentStatus::Running, now())]),
    );
    let store = Arc::new(MemoryStateStore::new());
    let notifier = Arc::new(RecordingNotifier::failing());
    let listener = listener(&source, &store, &notifier, true);

    let err = assert_err!(listener.check_app("app", now()).await);
    assert!(matches!(err, ListenerError::Notification(_)));

    // State was written before the send, so the next tick stays quiet
    assert_eq!(store.len(), 1);
    let sent = assert_ok!(listener.check_app("app", now()).await);
    assert_eq!(sent, 0);
}

#[tokio::test]
async fn test_empty_listing() {
    let source = Arc::new(FakeSource::new());
    let store = Arc::new(MemoryStateStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let listener = listener(&source, &store, &notifier, false);

    let summary = assert_ok!(listener.run_once_at(&apps(&["quiet"]), now()).await);
    assert_eq!(summary.apps_checked, 1);
    assert_eq!(summary.notifications_sent, 0);
}

#[tokio::test]
async fn test_store_failure_never_strands_a_started_deployment() {
    let source = Arc::new(FakeSource::new().with_listing(
        "app",
        vec![
            deployment("d1", DeploymentStatus::Running, now() - Duration::minutes(1)),
            deployment("d2", DeploymentStatus::Running, now() - Duration::minutes(10)),
        ],
    ));
    let store = Arc::new(CountingStore::failing_put(2));
    let notifier = Arc::new(RecordingNotifier::new());
    let listener = Listener::new(
        source.clone(),
        store.clone(),
        notifier.clone(),
        RunOptions::default(),
    );

    let err = assert_err!(listener.check_app("app", now()).await);
    assert!(matches!(err, ListenerError::StateStore(_)));
    assert_eq!(notifier.sent_stacks(), vec!["stack-d1"]);

    let sent = assert_ok!(listener.check_app("app", now()).await);
    assert_eq!(sent, 1);
    assert_eq!(notifier.sent_stacks(), vec!["stack-d1", "stack-d2"]);

    let mut tracked: Vec<String> = store.inner.snapshot().into_keys().collect();
    tracked.sort();
    assert_eq!(tracked, vec!["d1", "d2"]);
}

#[tokio::test]
async fn test_failed_post_does_not_drop_the_rest_of_the_batch() {
    let source = Arc::new(FakeSource::new().with_listing(
        "app",
        vec![
            deployment("d1", DeploymentStatus::Running, now() - Duration::minutes(1)),
            deployment("d2", DeploymentStatus::Running, now() - Duration::minutes(10)),
        ],
    ));
    let store = Arc::new(MemoryStateStore::new());
    let notifier = Arc::new(RecordingNotifier::failing_first(1));
    let listener = listener(&source, &store, &notifier, true);

    let err = assert_err!(listener.check_app("app", now()).await);
    assert!(matches!(err, ListenerError::Notification(_)));

    // Only d1's post was refused
    assert_eq!(notifier.sent_stacks(), vec!["stack-d2"]);
    assert_eq!(store.len(), 2);

    let sent = assert_ok!(listener.check_app("app", now()).await);
    assert_eq!(sent, 0);
}
