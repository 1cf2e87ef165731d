//! Slack notifier

use async_trait::async_trait;
use tracing::info;

use crate::errors::ListenerError;
use crate::http::slack::{Attachment, PostMessage, SlackClient};
use crate::models::deployment::format_timestamp;
use crate::models::notification::{Notification, NotificationKind};
use crate::notify::Notifier;

/// Where and as whom to post
#[derive(Debug, Clone, Default)]
pub struct SlackTarget {
    pub channel: String,
    pub username: Option<String>,
    pub icon_url: Option<String>,
    pub icon_emoji: Option<String>,
}

/// Title and body text for a notification
pub fn title_and_text(notification: &Notification) -> (&'static str, String) {
    let completed_at = notification
        .completed_at
        .as_ref()
        .map(format_timestamp)
        .unwrap_or_else(|| "-".to_string());

    match notification.kind {
        NotificationKind::Started => (
            "Deploy started.",
            format!(
                "Deploy started.\nCreatedAt: {}",
                format_timestamp(&notification.created_at)
            ),
        ),
        NotificationKind::Succeeded => (
            "Deploy finished successful",
            format!("Deploy finished successful.\nCompletedAt: {}", completed_at),
        ),
        NotificationKind::Failed => (
            "Deploy failed",
            format!("Deploy failed!\nCompletedAt: {}", completed_at),
        ),
    }
}

/// Build the attachment describing a notification
pub fn attachment(notification: &Notification) -> Attachment {
    let (title, text) = title_and_text(notification);
    Attachment {
        fallback: title.to_string(),
        pretext: notification.stack_name.clone(),
        text,
        color: notification.kind.color().to_string(),
    }
}

/// Posts notifications to a Slack channel
pub struct SlackNotifier {
    client: SlackClient,
    target: SlackTarget,
}

impl SlackNotifier {
    pub fn new(client: SlackClient, target: SlackTarget) -> Self {
        Self { client, target }
    }

    pub fn message(&self, notification: &Notification) -> PostMessage {
        PostMessage {
            channel: self.target.channel.clone(),
            username: self.target.username.clone(),
            icon_url: self.target.icon_url.clone(),
            icon_emoji: self.target.icon_emoji.clone(),
            attachments: vec![attachment(notification)],
        }
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), ListenerError> {
        let ts = self.client.post_message(&self.message(notification)).await?;
        info!(
            "Posted {:?} notification for {} to {} (ts {})",
            notification.kind,
            notification.stack_name,
            self.target.channel,
            ts.as_deref().unwrap_or("-")
        );
        Ok(())
    }
}
