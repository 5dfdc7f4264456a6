//! Free-text search over hashes and heights.

use crate::RegistryClient;
use crate::error::RegistryError;
use crate::queries::wire::WireSearch;
use dualscan_core::{Chain, ChainPage};

impl RegistryClient {
    /// Search one chain. Zero matches is a success with empty lists.
    pub async fn search(&self, chain: Chain, query: &str) -> Result<ChainPage, RegistryError> {
        let found: Option<WireSearch> = self
            .get_json(chain, &["search"], &[("q", query.to_string())])
            .await?;
        let found = found.unwrap_or_default();
        let blocks = found
            .blocks
            .into_iter()
            .map(|b| b.into_summary(chain))
            .collect::<Result<Vec<_>, _>>()?;
        let transactions = found
            .transactions
            .into_iter()
            .map(|tx| tx.into_summary(chain))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(
            "Search '{}' on {}: {} block(s), {} transaction(s)",
            query,
            chain,
            blocks.len(),
            transactions.len()
        );
        Ok(ChainPage {
            blocks,
            transactions,
        })
    }
}
