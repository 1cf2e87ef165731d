//! Shared AWS SDK configuration
//!
//! Credentials and the default region come from the SDK's standard provider
//! chain (environment, shared profile, container or instance role).

use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use tracing::debug;

use crate::http::client::REQUEST_TIMEOUT;

/// Region used when neither settings nor the environment name one
pub const FALLBACK_REGION: &str = "us-east-1";

/// Load the SDK configuration shared by every AWS client of one invocation
pub async fn load_sdk_config() -> SdkConfig {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(REQUEST_TIMEOUT)
                .build(),
        )
        .load()
        .await;

    debug!(
        "Loaded AWS config (default region {})",
        config.region().map(|r| r.as_ref()).unwrap_or("unset")
    );
    config
}

/// Region for one client: an explicit override wins over the shared config
pub fn client_region(explicit: Option<&str>, config: &SdkConfig) -> Region {
    match explicit {
        Some(region) => Region::new(region.to_string()),
        None => config
            .region()
            .cloned()
            .unwrap_or_else(|| Region::new(FALLBACK_REGION)),
    }
}
