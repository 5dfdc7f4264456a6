//! Per-chain counters.

use crate::RegistryClient;
use crate::error::RegistryError;
use crate::queries::wire::WireStats;
use dualscan_core::{Chain, ChainStats};

impl RegistryClient {
    /// Get block and transaction totals for `chain`.
    pub async fn get_stats(&self, chain: Chain) -> Result<ChainStats, RegistryError> {
        let stats: WireStats = self.get_json(chain, &["stats"], &[]).await?;
        Ok(stats.into())
    }
}
