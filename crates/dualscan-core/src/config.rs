//! Application configuration and persistence utilities.
//!
//! Preferences only. Chain data is never written to disk.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::display::MAX_AMOUNT_DECIMALS;
use crate::types::{Chain, PerChain};
use crate::view::PageSizes;

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// Other configuration error.
    #[error("{0}")]
    Other(String),
}

/// How one chain is addressed on the registry and labelled in the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainProfile {
    /// Path segment used by the registry, e.g. `bitcoin`.
    pub slug: String,
    pub label: String,
    pub symbol: String,
    /// Decimal places between the base unit and the display unit.
    pub decimals: u8,
}

impl ChainProfile {
    pub fn default_primary() -> Self {
        Self {
            slug: "ethereum".to_string(),
            label: "Ethereum".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }

    pub fn default_secondary() -> Self {
        Self {
            slug: "bitcoin".to_string(),
            label: "Bitcoin".to_string(),
            symbol: "BTC".to_string(),
            decimals: 8,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Registry base URL, including the API prefix.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound for every registry call.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_overview_page_size")]
    pub overview_page_size: u32,
    #[serde(default = "default_explorer_page_size")]
    pub explorer_page_size: u32,
    /// Start with the live feed paused.
    #[serde(default)]
    pub start_paused: bool,
    #[serde(default = "ChainProfile::default_primary")]
    pub primary: ChainProfile,
    #[serde(default = "ChainProfile::default_secondary")]
    pub secondary: ChainProfile,
}

fn default_api_base_url() -> String {
    "http://localhost:8989/api/v1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    4_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_overview_page_size() -> u32 {
    8
}

fn default_explorer_page_size() -> u32 {
    15
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            overview_page_size: default_overview_page_size(),
            explorer_page_size: default_explorer_page_size(),
            start_paused: false,
            primary: ChainProfile::default_primary(),
            secondary: ChainProfile::default_secondary(),
        }
    }
}

impl AppConfig {
    pub fn page_sizes(&self) -> PageSizes {
        PageSizes {
            overview: self.overview_page_size,
            explorer: self.explorer_page_size,
        }
    }

    pub fn profile(&self, chain: Chain) -> &ChainProfile {
        match chain {
            Chain::Primary => &self.primary,
            Chain::Secondary => &self.secondary,
        }
    }

    pub fn profiles(&self) -> PerChain<ChainProfile> {
        PerChain::new(self.primary.clone(), self.secondary.clone())
    }

    /// Reject values the session cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Other("api_base_url is empty".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Other(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Other(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        if self.overview_page_size == 0 || self.explorer_page_size == 0 {
            return Err(ConfigError::Other("page sizes must be positive".to_string()));
        }
        for profile in [&self.primary, &self.secondary] {
            if profile.decimals > MAX_AMOUNT_DECIMALS {
                return Err(ConfigError::Other(format!(
                    "'{}' uses {} decimals, at most {} are supported",
                    profile.slug, profile.decimals, MAX_AMOUNT_DECIMALS
                )));
            }
        }
        if self.primary.slug == self.secondary.slug {
            return Err(ConfigError::Other(format!(
                "both chains use the slug '{}'",
                self.primary.slug
            )));
        }
        Ok(())
    }
}

// ==================== Path Utilities ====================

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("xyz", "dualscan", "dualscan")
}

/// Get the config directory.
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    project_dirs()
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| ConfigError::Other("Could not determine config directory".to_string()))
}

/// Get the config file path.
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    get_config_dir().map(|dir| dir.join("config.json"))
}

// ==================== Config I/O ====================

/// Load configuration from `path`. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config = serde_json::from_str(&content)?;
    Ok(config)
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Backup a corrupted config file for debugging.
pub fn backup_corrupted_config(path: &Path) -> Result<PathBuf, ConfigError> {
    let parent = path
        .parent()
        .ok_or_else(|| ConfigError::Other("Config path has no parent".to_string()))?;
    let backup_path = parent.join(format!(
        "config.backup.{}",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    ));
    fs::copy(path, &backup_path)?;
    Ok(backup_path)
}

/// Load configuration, falling back to defaults when the file is unreadable.
///
/// A file that fails to parse is copied aside first so it can be inspected.
pub fn load_config_or_default(path: &Path) -> AppConfig {
    match load_config_from(path) {
        Ok(config) => config,
        Err(ConfigError::Json(e)) => {
            tracing::warn!("Config at {} is corrupted: {}", path.display(), e);
            match backup_corrupted_config(path) {
                Ok(backup) => tracing::info!("Corrupted config saved to {}", backup.display()),
                Err(e) => tracing::warn!("Failed to back up corrupted config: {}", e),
            }
            AppConfig::default()
        }
        Err(e) => {
            tracing::warn!("Failed to read config at {}: {}", path.display(), e);
            AppConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "dualscan-config-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8989/api/v1");
        assert_eq!(config.poll_interval_ms, 4_000);
        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.page_sizes(), PageSizes::default());
        assert!(!config.start_paused);
        assert_eq!(config.primary.slug, "ethereum");
        assert_eq!(config.secondary.slug, "bitcoin");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_deserialize_missing_fields() {
        let json = r#"{"poll_interval_ms": 2000}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.poll_interval_ms, 2_000);
        assert_eq!(config.explorer_page_size, 15);
        assert_eq!(config.secondary, ChainProfile::default_secondary());
    }

    #[test]
    fn test_profile_lookup() {
        let config = AppConfig::default();
        assert_eq!(config.profile(Chain::Primary).symbol, "ETH");
        assert_eq!(config.profile(Chain::Secondary).decimals, 8);
        assert_eq!(config.profiles().secondary.label, "Bitcoin");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig {
            poll_interval_ms: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        config.poll_interval_ms = 1_000;
        config.secondary.slug = config.primary.slug.clone();
        assert!(config.validate().is_err());

        config = AppConfig {
            explorer_page_size: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_decimals() {
        let mut config = AppConfig::default();
        config.primary.decimals = MAX_AMOUNT_DECIMALS;
        assert!(config.validate().is_ok());

        config.primary.decimals = MAX_AMOUNT_DECIMALS + 1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("39 decimals"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = scratch_dir("roundtrip");
        let path = dir.join("config.json");
        let config = AppConfig {
            api_base_url: "http://registry.test/api/v1".to_string(),
            start_paused: true,
            ..AppConfig::default()
        };

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = scratch_dir("missing");
        let loaded = load_config_from(&dir.join("config.json")).unwrap();
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_corrupted_config_is_backed_up() {
        let dir = scratch_dir("corrupted");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let config = load_config_or_default(&path);
        assert_eq!(config, AppConfig::default());

        let backups = fs::read_dir(&dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("config.backup."))
            .count();
        assert_eq!(backups, 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_get_config_path() {
        let result = get_config_path();
        assert!(result.is_ok());
        assert!(result.unwrap().to_string_lossy().contains("config.json"));
    }
}
