//! Application configuration options

use std::time::Duration;

use crate::deploy::fsm::FsmSettings;
use crate::storage::settings::Settings;

/// Options for one listener run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Tracker settings
    pub fsm_settings: FsmSettings,

    /// Abort the run on the first failing application instead of moving on
    pub fail_fast: bool,
}

impl From<&Settings> for RunOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            fsm_settings: FsmSettings {
                freshness_window: Duration::from_secs(settings.freshness_window_secs),
            },
            fail_fast: settings.fail_fast,
        }
    }
}
