//! Slack Web API client

use reqwest::{header, Client};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::errors::ListenerError;

pub const DEFAULT_BASE_URL: &str = "https://slack.com/api";

/// Legacy message attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub fallback: String,
    pub pretext: String,
    pub text: String,
    pub color: String,
}

/// `chat.postMessage` request body
#[derive(Debug, Clone, Serialize)]
pub struct PostMessage {
    pub channel: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,

    pub attachments: Vec<Attachment>,
}

/// Envelope every Web API method answers with
#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,

    #[serde(default)]
    error: Option<String>,

    #[serde(default)]
    ts: Option<String>,
}

/// Slack Web API client
pub struct SlackClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl SlackClient {
    pub fn new(client: Client, base_url: &str, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: SecretString::from(token),
        }
    }

    /// Post a message, returning its timestamp ID
    pub async fn post_message(&self, message: &PostMessage) -> Result<Option<String>, ListenerError> {
        let url = format!("{}/chat.postMessage", self.base_url);
        debug!("POST {} (channel {})", url, message.channel);

        let response = self
            .client
            .post(&url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .json(message)
            .send()
            .await
            .map_err(|e| ListenerError::Notification(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Slack POST failed: {} - {}", status, body);
            return Err(ListenerError::Notification(format!("{}: {}", status, body)));
        }

        let body: SlackResponse = response
            .json()
            .await
            .map_err(|e| ListenerError::Notification(e.to_string()))?;

        if !body.ok {
            let reason = body.error.unwrap_or_else(|| "unknown_error".to_string());
            error!("Slack rejected message: {}", reason);
            return Err(ListenerError::Notification(reason));
        }

        Ok(body.ts)
    }
}
