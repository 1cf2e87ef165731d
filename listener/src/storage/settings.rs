//! Settings file management

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::ListenerError;
use crate::filesys::file::File;
use crate::http::slack::DEFAULT_BASE_URL;
use crate::logs::LogLevel;
use crate::source::opsworks;
use crate::state::dynamodb;

/// Environment variable pointing at the settings file
pub const SETTINGS_PATH_VAR: &str = "DEPLOY_LISTENER_SETTINGS";

/// Listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,

    /// Also write logs to daily files in this directory
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Applications whose deployments are watched
    #[serde(default)]
    pub app_ids: Vec<String>,

    /// Slack configuration
    pub slack: SlackSettings,

    /// OpsWorks API configuration
    #[serde(default)]
    pub opsworks: OpsWorksSettings,

    /// Where tracked deployment state lives
    #[serde(default)]
    pub state: StateSettings,

    /// Deployments older than this many seconds are ignored
    #[serde(default = "default_freshness_window")]
    pub freshness_window_secs: u64,

    /// Abort the whole run on the first failing application
    #[serde(default)]
    pub fail_fast: bool,
}

fn default_freshness_window() -> u64 {
    3600
}

impl Settings {
    /// Load and validate settings from a JSON file
    pub async fn load(file: &File) -> Result<Self, ListenerError> {
        let settings: Settings = file.read_json().await.map_err(|e| {
            ListenerError::ConfigError(format!("{}: {}", file.path().display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ListenerError> {
        if self.app_ids.is_empty() {
            return Err(ListenerError::ConfigError(
                "app_ids must list at least one application".to_string(),
            ));
        }
        if self.slack.channel.is_empty() {
            return Err(ListenerError::ConfigError(
                "slack.channel is empty".to_string(),
            ));
        }
        if self.freshness_window_secs == 0 {
            return Err(ListenerError::ConfigError(
                "freshness_window_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Slack settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackSettings {
    /// Bot token
    #[serde(default)]
    pub token: String,

    /// Channel to post to
    pub channel: String,

    /// Display name of the poster
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub icon_url: Option<String>,

    #[serde(default)]
    pub icon_emoji: Option<String>,

    /// Web API base URL
    #[serde(default = "default_slack_base_url")]
    pub base_url: String,
}

fn default_slack_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// OpsWorks API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsWorksSettings {
    #[serde(default = "default_opsworks_region")]
    pub region: String,

    /// Endpoint override
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_opsworks_region() -> String {
    opsworks::DEFAULT_REGION.to_string()
}

impl Default for OpsWorksSettings {
    fn default() -> Self {
        Self {
            region: default_opsworks_region(),
            endpoint: None,
        }
    }
}

/// State store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StateSettings {
    Dynamodb {
        #[serde(default = "default_table")]
        table: String,

        /// Defaults to the region of the AWS environment
        #[serde(default)]
        region: Option<String>,

        /// Endpoint override
        #[serde(default)]
        endpoint: Option<String>,
    },
    File {
        path: PathBuf,
    },
}

fn default_table() -> String {
    dynamodb::DEFAULT_TABLE.to_string()
}

impl Default for StateSettings {
    fn default() -> Self {
        StateSettings::Dynamodb {
            table: default_table(),
            region: None,
            endpoint: None,
        }
    }
}
