//! JSON shapes returned by the registry and their conversion to core types.
//!
//! The registry has served two payload styles over time (snake_case model
//! rows and camelCase DTOs), so field aliases cover both.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use dualscan_core::{
    BlockDetail, BlockSummary, Chain, ChainStats, TransactionDetail, TransactionSummary,
};
use serde::{Deserialize, Deserializer};

use crate::error::RegistryError;

/// Accept `null` wherever a list is expected.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Timestamps arrive as RFC 3339 strings or as unix seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireTimestamp {
    Unix(i64),
    Text(String),
}

impl WireTimestamp {
    pub(crate) fn to_utc(&self) -> Result<DateTime<Utc>, RegistryError> {
        match self {
            WireTimestamp::Unix(secs) => DateTime::from_timestamp(*secs, 0).ok_or_else(|| {
                RegistryError::MalformedResponse(format!("timestamp out of range: {}", secs))
            }),
            WireTimestamp::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| {
                    RegistryError::MalformedResponse(format!("bad timestamp '{}': {}", text, e))
                }),
        }
    }
}

/// Amounts are decimal strings, occasionally plain JSON numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireAmount {
    Text(String),
    Number(serde_json::Number),
}

impl WireAmount {
    fn into_string(self) -> String {
        match self {
            WireAmount::Text(text) => text,
            WireAmount::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireStats {
    #[serde(alias = "totalBlocks")]
    pub total_blocks: u64,
    #[serde(alias = "totalTx", alias = "totalTransactions")]
    pub total_transactions: u64,
    #[serde(default, alias = "latestBlock")]
    pub latest_block: Option<u64>,
    #[serde(default)]
    pub synced: Option<bool>,
}

impl From<WireStats> for ChainStats {
    fn from(wire: WireStats) -> Self {
        ChainStats {
            total_blocks: wire.total_blocks,
            total_transactions: wire.total_transactions,
            latest_block: wire.latest_block,
            synced: wire.synced,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireBlock {
    pub height: u64,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default, alias = "txCount")]
    pub tx_count: Option<u64>,
    pub timestamp: WireTimestamp,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub transactions: Vec<WireTransaction>,
}

impl WireBlock {
    pub(crate) fn into_summary(self, chain: Chain) -> Result<BlockSummary, RegistryError> {
        Ok(self.split(chain)?.0)
    }

    pub(crate) fn into_detail(self, chain: Chain) -> Result<BlockDetail, RegistryError> {
        let (mut summary, transactions) = self.split(chain)?;
        let transactions = transactions
            .into_iter()
            .map(|tx| tx.into_detail(chain))
            .collect::<Result<Vec<_>, _>>()?;
        if summary.tx_count.is_none() {
            summary.tx_count = Some(transactions.len() as u64);
        }
        Ok(BlockDetail {
            summary,
            transactions,
        })
    }

    fn split(self, chain: Chain) -> Result<(BlockSummary, Vec<WireTransaction>), RegistryError> {
        let hash = non_empty(self.hash)
            .or_else(|| non_empty(self.block_hash))
            .ok_or_else(|| {
                RegistryError::MalformedResponse(format!("block {} has no hash", self.height))
            })?;
        let summary = BlockSummary {
            chain,
            height: self.height,
            hash,
            timestamp: self.timestamp.to_utc()?,
            tx_count: self.tx_count,
        };
        Ok((summary, self.transactions))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WireTransaction {
    pub hash: String,
    #[serde(default)]
    pub value: Option<WireAmount>,
    #[serde(default, alias = "from")]
    pub from_address: Option<String>,
    #[serde(default, alias = "to")]
    pub to_address: Option<String>,
    #[serde(default, alias = "block_height")]
    pub height: Option<u64>,
    pub timestamp: WireTimestamp,
    /// Everything else the registry sent, shown verbatim in detail views.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl WireTransaction {
    pub(crate) fn into_summary(self, chain: Chain) -> Result<TransactionSummary, RegistryError> {
        Ok(self.split(chain)?.0)
    }

    pub(crate) fn into_detail(self, chain: Chain) -> Result<TransactionDetail, RegistryError> {
        let (summary, fields) = self.split(chain)?;
        Ok(TransactionDetail { summary, fields })
    }

    fn split(
        self,
        chain: Chain,
    ) -> Result<(TransactionSummary, BTreeMap<String, serde_json::Value>), RegistryError> {
        if self.hash.is_empty() {
            return Err(RegistryError::MalformedResponse(
                "transaction has no hash".to_string(),
            ));
        }
        let summary = TransactionSummary {
            chain,
            hash: self.hash,
            value: self
                .value
                .map(WireAmount::into_string)
                .unwrap_or_else(|| "0".to_string()),
            timestamp: self.timestamp.to_utc()?,
            from: non_empty(self.from_address),
            to: non_empty(self.to_address),
            height: self.height,
        };
        Ok((summary, self.extra))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireSearch {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub blocks: Vec<WireBlock>,
    #[serde(default, deserialize_with = "null_as_empty", alias = "txs")]
    pub transactions: Vec<WireTransaction>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_timestamp_formats() {
        let text: WireTimestamp = serde_json::from_str(r#""2024-01-02T03:04:05Z""#).unwrap();
        let unix: WireTimestamp = serde_json::from_str("1704164645").unwrap();
        assert_eq!(text.to_utc().unwrap(), unix.to_utc().unwrap());

        let offset: WireTimestamp =
            serde_json::from_str(r#""2024-01-02T05:04:05+02:00""#).unwrap();
        assert_eq!(offset.to_utc().unwrap(), unix.to_utc().unwrap());

        let bad: WireTimestamp = serde_json::from_str(r#""yesterday""#).unwrap();
        assert!(matches!(
            bad.to_utc(),
            Err(RegistryError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_model_block_row() {
        let json = r#"{
            "id": 7, "chain": "bitcoin", "height": 830000,
            "hash": "0000abc", "block_hash": "",
            "timestamp": "2024-02-01T12:00:00Z", "created_at": "2024-02-01T12:00:05Z"
        }"#;
        let block: WireBlock = serde_json::from_str(json).unwrap();
        let summary = block.into_summary(Chain::Secondary).unwrap();
        assert_eq!(summary.height, 830000);
        assert_eq!(summary.hash, "0000abc");
        assert_eq!(summary.chain, Chain::Secondary);
        assert_eq!(summary.tx_count, None);
    }

    #[test]
    fn test_dto_block_row() {
        let json = r#"{"height": 19000000, "hash": "0xfeed", "txCount": 120, "timestamp": 1700000000}"#;
        let block: WireBlock = serde_json::from_str(json).unwrap();
        let summary = block.into_summary(Chain::Primary).unwrap();
        assert_eq!(summary.tx_count, Some(120));
        assert_eq!(summary.timestamp.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_block_hash_fallback() {
        let json = r#"{"height": 1, "block_hash": "0xaa", "timestamp": 1}"#;
        let block: WireBlock = serde_json::from_str(json).unwrap();
        assert_eq!(block.into_summary(Chain::Primary).unwrap().hash, "0xaa");

        let json = r#"{"height": 1, "timestamp": 1}"#;
        let block: WireBlock = serde_json::from_str(json).unwrap();
        assert!(block.into_summary(Chain::Primary).is_err());
    }

    #[test]
    fn test_block_detail_with_null_transactions() {
        let json = r#"{"height": 5, "hash": "h5", "timestamp": 50, "transactions": null}"#;
        let block: WireBlock = serde_json::from_str(json).unwrap();
        let detail = block.into_detail(Chain::Secondary).unwrap();
        assert!(detail.transactions.is_empty());
        assert_eq!(detail.summary.tx_count, Some(0));
    }

    #[test]
    fn test_transaction_fields() {
        let json = r#"{
            "id": 1, "chain": "ethereum", "hash": "0xt1", "block_hash": "0xb",
            "height": 42, "from_address": "0xfrom", "to_address": "",
            "value": "1000000000000000000", "status": "success",
            "timestamp": "2024-02-01T12:00:00Z", "created_at": "2024-02-01T12:00:05Z"
        }"#;
        let tx: WireTransaction = serde_json::from_str(json).unwrap();
        let detail = tx.into_detail(Chain::Primary).unwrap();
        assert_eq!(detail.summary.value, "1000000000000000000");
        assert_eq!(detail.summary.from.as_deref(), Some("0xfrom"));
        assert_eq!(detail.summary.to, None);
        assert_eq!(detail.summary.height, Some(42));
        assert_eq!(detail.fields.get("status"), Some(&serde_json::json!("success")));
        assert!(detail.fields.contains_key("block_hash"));
        assert!(!detail.fields.contains_key("hash"));
    }

    #[test]
    fn test_dto_transaction_aliases() {
        let json = r#"{"hash": "abc", "from": "a", "to": "b", "value": 5000, "height": 9, "timestamp": 1}"#;
        let tx: WireTransaction = serde_json::from_str(json).unwrap();
        let summary = tx.into_summary(Chain::Secondary).unwrap();
        assert_eq!(summary.value, "5000");
        assert_eq!(summary.from.as_deref(), Some("a"));
        assert_eq!(summary.to.as_deref(), Some("b"));
    }

    #[test]
    fn test_stats_both_styles() {
        let model: WireStats =
            serde_json::from_str(r#"{"total_blocks": 10, "total_transactions": 20}"#).unwrap();
        let stats = ChainStats::from(model);
        assert_eq!(stats.total_blocks, 10);
        assert_eq!(stats.latest_block, None);

        let dto: WireStats = serde_json::from_str(
            r#"{"latestBlock": 15, "totalBlocks": 10, "totalTx": 20, "synced": false}"#,
        )
        .unwrap();
        let stats = ChainStats::from(dto);
        assert_eq!(stats.lag(), Some(5));
        assert_eq!(stats.synced, Some(false));
    }

    #[test]
    fn test_search_nulls() {
        let search: WireSearch =
            serde_json::from_str(r#"{"blocks": null, "transactions": null}"#).unwrap();
        assert!(search.blocks.is_empty());
        assert!(search.transactions.is_empty());

        let search: WireSearch = serde_json::from_str("{}").unwrap();
        assert!(search.blocks.is_empty());
    }
}
