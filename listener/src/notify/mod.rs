//! Notification sinks

pub mod slack;

use async_trait::async_trait;
use tracing::info;

use crate::errors::ListenerError;
use crate::models::notification::Notification;

/// Destination for deployment lifecycle notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), ListenerError>;
}

/// Writes notifications to the log instead of sending them anywhere
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), ListenerError> {
        let (title, text) = slack::title_and_text(notification);
        info!(
            stack = %notification.stack_name,
            color = notification.kind.color(),
            "{}: {}",
            title,
            text.replace('\n', " ")
        );
        Ok(())
    }
}
