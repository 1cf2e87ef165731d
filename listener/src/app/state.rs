//! Application state: the collaborators of one invocation

use std::sync::Arc;

use aws_config::SdkConfig;
use tracing::info;

use crate::app::options::RunOptions;
use crate::app::run::Listener;
use crate::authn::aws::{client_region, load_sdk_config};
use crate::errors::ListenerError;
use crate::filesys::file::File;
use crate::http::client::build_http_client;
use crate::http::slack::SlackClient;
use crate::notify::slack::{SlackNotifier, SlackTarget};
use crate::notify::{LogNotifier, Notifier};
use crate::source::opsworks::OpsWorksSource;
use crate::source::DeploymentSource;
use crate::state::dynamodb::DynamoDbStateStore;
use crate::state::file::FileStateStore;
use crate::state::memory::MemoryStateStore;
use crate::state::StateStore;
use crate::storage::settings::{Settings, StateSettings};

/// Environment variable holding the Slack token when settings leave it empty
pub const SLACK_TOKEN_VAR: &str = "SLACK_TOKEN";

/// Everything one run needs
pub struct AppState {
    pub listener: Listener,
    pub app_ids: Vec<String>,
}

impl AppState {
    /// Build the clients and adapters described by `settings`.
    ///
    /// A dry run keeps state in memory and logs notifications instead of
    /// posting them.
    pub async fn init(settings: &Settings, dry_run: bool) -> Result<Self, ListenerError> {
        info!("Initializing application state...");

        let sdk_config = load_sdk_config().await;
        let source: Arc<dyn DeploymentSource> =
            Arc::new(OpsWorksSource::new(opsworks_client(settings, &sdk_config)));

        let store: Arc<dyn StateStore> = if dry_run {
            info!("Dry run: tracking state in memory");
            Arc::new(MemoryStateStore::new())
        } else {
            match &settings.state {
                StateSettings::Dynamodb {
                    table,
                    region,
                    endpoint,
                } => {
                    let region = client_region(region.as_deref(), &sdk_config);
                    info!("Tracking state in DynamoDB table {} ({})", table, region);
                    let mut config = aws_sdk_dynamodb::config::Builder::from(&sdk_config).region(region);
                    if let Some(endpoint) = endpoint {
                        config = config.endpoint_url(endpoint);
                    }
                    let client = aws_sdk_dynamodb::Client::from_conf(config.build());
                    Arc::new(DynamoDbStateStore::new(client, table.clone()))
                }
                StateSettings::File { path } => {
                    info!("Tracking state in {}", path.display());
                    Arc::new(FileStateStore::new(File::new(path)))
                }
            }
        };

        let notifier: Arc<dyn Notifier> = if dry_run {
            info!("Dry run: notifications are logged only");
            Arc::new(LogNotifier)
        } else {
            let token = slack_token(settings)?;
            let client = SlackClient::new(build_http_client()?, &settings.slack.base_url, token);
            Arc::new(SlackNotifier::new(
                client,
                SlackTarget {
                    channel: settings.slack.channel.clone(),
                    username: settings.slack.username.clone(),
                    icon_url: settings.slack.icon_url.clone(),
                    icon_emoji: settings.slack.icon_emoji.clone(),
                },
            ))
        };

        Ok(Self {
            listener: Listener::new(source, store, notifier, RunOptions::from(settings)),
            app_ids: settings.app_ids.clone(),
        })
    }
}

fn opsworks_client(settings: &Settings, sdk_config: &SdkConfig) -> aws_sdk_opsworks::Client {
    let region = client_region(Some(&settings.opsworks.region), sdk_config);
    let mut config = aws_sdk_opsworks::config::Builder::from(sdk_config).region(region);
    if let Some(endpoint) = &settings.opsworks.endpoint {
        config = config.endpoint_url(endpoint);
    }
    aws_sdk_opsworks::Client::from_conf(config.build())
}

fn slack_token(settings: &Settings) -> Result<String, ListenerError> {
    if !settings.slack.token.is_empty() {
        return Ok(settings.slack.token.clone());
    }
    std::env::var(SLACK_TOKEN_VAR)
        .ok()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ListenerError::ConfigError(format!(
                "slack.token is empty and {} is not set",
                SLACK_TOKEN_VAR
            ))
        })
}
