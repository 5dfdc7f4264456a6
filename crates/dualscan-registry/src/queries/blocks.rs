//! Block list and block detail queries.

use crate::RegistryClient;
use crate::error::RegistryError;
use crate::queries::wire::WireBlock;
use dualscan_core::{BlockDetail, BlockSummary, Chain, Window};

impl RegistryClient {
    /// Get one page of blocks, most recent first.
    pub async fn get_blocks(
        &self,
        chain: Chain,
        window: Window,
    ) -> Result<Vec<BlockSummary>, RegistryError> {
        let query = [
            ("limit", window.limit.to_string()),
            ("offset", window.offset.to_string()),
        ];
        let blocks: Option<Vec<WireBlock>> = self.get_json(chain, &["blocks"], &query).await?;
        let blocks = blocks
            .unwrap_or_default()
            .into_iter()
            .map(|b| b.into_summary(chain))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("Fetched {} {} blocks at offset {}", blocks.len(), chain, window.offset);
        Ok(blocks)
    }

    /// Get a block and its transactions by hash.
    pub async fn get_block_detail(
        &self,
        chain: Chain,
        hash: &str,
    ) -> Result<BlockDetail, RegistryError> {
        let block: WireBlock = self
            .get_json(chain, &["block", "hash", hash], &[])
            .await?;
        block.into_detail(chain)
    }
}
