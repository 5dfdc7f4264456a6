//! HTTP client for the indexing registry.
//!
//! `RegistryClient` holds no per-request state and can be shared across
//! tasks. The [`Registry`] trait is the seam the worker talks to, so tests can
//! substitute an in-memory registry.

use async_trait::async_trait;
use dualscan_core::{
    BlockDetail, BlockSummary, Chain, ChainPage, ChainStats, TransactionDetail,
    TransactionSummary, Window,
};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::RegistryConfig;
use crate::error::RegistryError;

/// Longest server error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// Read operations offered by the registry.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn get_stats(&self, chain: Chain) -> Result<ChainStats, RegistryError>;

    async fn get_blocks(
        &self,
        chain: Chain,
        window: Window,
    ) -> Result<Vec<BlockSummary>, RegistryError>;

    async fn get_transactions(
        &self,
        chain: Chain,
        window: Window,
    ) -> Result<Vec<TransactionSummary>, RegistryError>;

    async fn get_block_detail(&self, chain: Chain, hash: &str)
    -> Result<BlockDetail, RegistryError>;

    async fn get_transaction_detail(
        &self,
        chain: Chain,
        hash: &str,
    ) -> Result<TransactionDetail, RegistryError>;

    /// Blocks and transactions on `chain` matching `query`.
    async fn search(&self, chain: Chain, query: &str) -> Result<ChainPage, RegistryError>;
}

/// Error body the registry sends with non-2xx responses.
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct RegistryClient {
    http: reqwest::Client,
    config: RegistryConfig,
}

impl RegistryClient {
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("dualscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::InvalidConfig(e.to_string()))?;
        tracing::info!("Registry client targeting {}", config.base_url());
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// GET `{base}/{slug}/{segments}` and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        chain: Chain,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, RegistryError> {
        let url = self.config.endpoint(chain, segments)?;
        tracing::debug!("GET {} {:?}", url, query);

        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Server {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body = response.bytes().await.map_err(|e| self.request_error(e))?;
        serde_json::from_slice(&body)
            .map_err(|e| RegistryError::MalformedResponse(format!("{}: {}", url.path(), e)))
    }

    fn request_error(&self, err: reqwest::Error) -> RegistryError {
        if err.is_timeout() {
            RegistryError::Timeout(self.config.timeout().as_millis() as u64)
        } else {
            RegistryError::Transport(err.to_string())
        }
    }
}

fn error_message(body: &str) -> String {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());
    dualscan_core::truncate_str(&message, MAX_ERROR_BODY)
}

#[async_trait]
impl Registry for RegistryClient {
    async fn get_stats(&self, chain: Chain) -> Result<ChainStats, RegistryError> {
        RegistryClient::get_stats(self, chain).await
    }

    async fn get_blocks(
        &self,
        chain: Chain,
        window: Window,
    ) -> Result<Vec<BlockSummary>, RegistryError> {
        RegistryClient::get_blocks(self, chain, window).await
    }

    async fn get_transactions(
        &self,
        chain: Chain,
        window: Window,
    ) -> Result<Vec<TransactionSummary>, RegistryError> {
        RegistryClient::get_transactions(self, chain, window).await
    }

    async fn get_block_detail(
        &self,
        chain: Chain,
        hash: &str,
    ) -> Result<BlockDetail, RegistryError> {
        RegistryClient::get_block_detail(self, chain, hash).await
    }

    async fn get_transaction_detail(
        &self,
        chain: Chain,
        hash: &str,
    ) -> Result<TransactionDetail, RegistryError> {
        RegistryClient::get_transaction_detail(self, chain, hash).await
    }

    async fn search(&self, chain: Chain, query: &str) -> Result<ChainPage, RegistryError> {
        RegistryClient::search(self, chain, query).await
    }
}
