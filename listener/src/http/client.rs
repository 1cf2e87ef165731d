//! HTTP client implementation

use std::time::Duration;

use reqwest::Client;

use crate::errors::ListenerError;

/// Request timeout applied to every outgoing call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client used for chat delivery
pub fn build_http_client() -> Result<Client, ListenerError> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    Ok(client)
}
