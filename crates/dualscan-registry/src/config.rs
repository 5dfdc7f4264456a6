//! Registry endpoint configuration.
//!
//! The base URL is injected at startup; nothing in this crate hard-codes a
//! host.

use std::time::Duration;

use dualscan_core::{Chain, PerChain};
use reqwest::Url;

use crate::error::RegistryError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8989/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    base_url: Url,
    timeout: Duration,
    slugs: PerChain<String>,
}

impl RegistryConfig {
    /// Build a config. `base_url` must be an absolute http(s) URL.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        slugs: PerChain<String>,
    ) -> Result<Self, RegistryError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed)
            .map_err(|e| RegistryError::InvalidConfig(format!("{}: {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(RegistryError::InvalidConfig(format!(
                "unsupported scheme '{}'",
                base_url.scheme()
            )));
        }
        if base_url.cannot_be_a_base() {
            return Err(RegistryError::InvalidConfig(format!(
                "{} cannot be used as a base URL",
                base_url
            )));
        }
        if timeout.is_zero() {
            return Err(RegistryError::InvalidConfig(
                "timeout must be positive".to_string(),
            ));
        }
        for slug in [&slugs.primary, &slugs.secondary] {
            if slug.is_empty() || slug.contains('/') {
                return Err(RegistryError::InvalidConfig(format!(
                    "invalid chain slug '{}'",
                    slug
                )));
            }
        }
        Ok(Self {
            base_url,
            timeout,
            slugs,
        })
    }

    /// Local registry with the stock chain slugs.
    pub fn local() -> Result<Self, RegistryError> {
        Self::new(
            DEFAULT_BASE_URL,
            DEFAULT_TIMEOUT,
            PerChain::new("ethereum".to_string(), "bitcoin".to_string()),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn slug(&self, chain: Chain) -> &str {
        self.slugs.get(chain)
    }

    /// `{base}/{slug}/{segments...}`, each segment percent-encoded.
    pub fn endpoint(&self, chain: Chain, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                RegistryError::InvalidConfig(format!("{} cannot be a base", self.base_url))
            })?;
            path.pop_if_empty();
            path.push(self.slug(chain));
            path.extend(segments);
        }
        Ok(url)
    }
}
