//! Application configuration.
//!
//! The persisted preferences live in `dualscan-core`; this module layers the
//! command-line overrides on top of them.

pub use dualscan_core::config::{get_config_path, load_config_or_default, save_config_to};

use dualscan_core::AppConfig;

/// Values given on the command line. `None` keeps the stored preference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    /// `--paused` can only switch pausing on; resuming is a keypress away.
    pub start_paused: bool,
}

impl Overrides {
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(url) = &self.api_url {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(ms) = self.request_timeout_ms {
            config.request_timeout_ms = ms;
        }
        config.start_paused |= self.start_paused;
        config
    }
}
