//! Transaction list and transaction detail queries.

use crate::RegistryClient;
use crate::error::RegistryError;
use crate::queries::wire::WireTransaction;
use dualscan_core::{Chain, TransactionDetail, TransactionSummary, Window};

impl RegistryClient {
    /// Get one page of transactions, most recent first.
    pub async fn get_transactions(
        &self,
        chain: Chain,
        window: Window,
    ) -> Result<Vec<TransactionSummary>, RegistryError> {
        let query = [
            ("limit", window.limit.to_string()),
            ("offset", window.offset.to_string()),
        ];
        let txs: Option<Vec<WireTransaction>> = self.get_json(chain, &["txs"], &query).await?;
        let txs = txs
            .unwrap_or_default()
            .into_iter()
            .map(|tx| tx.into_summary(chain))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("Fetched {} {} transactions at offset {}", txs.len(), chain, window.offset);
        Ok(txs)
    }

    pub async fn get_transaction_detail(
        &self,
        chain: Chain,
        hash: &str,
    ) -> Result<TransactionDetail, RegistryError> {
        let tx: WireTransaction = self.get_json(chain, &["tx", hash], &[]).await?;
        tx.into_detail(chain)
    }
}
