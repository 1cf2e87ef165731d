//! Error types for the deploy listener

use thiserror::Error;

/// Main error type for the deploy listener
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The deployment listing service was unreachable or answered garbage
    #[error("Upstream listing error: {0}")]
    UpstreamListing(String),

    /// Reading or writing tracked deployment state failed
    #[error("State store error: {0}")]
    StateStore(String),

    /// The chat transport refused or failed to deliver a message
    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Run failed for {failed} of {total} application(s)")]
    RunFailed { failed: usize, total: usize },
}
