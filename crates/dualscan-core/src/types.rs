//! Core domain types for the dual-chain explorer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One of the two independent ledgers tracked by the explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Chain {
    Primary,
    Secondary,
}

impl Chain {
    /// Both chains, primary first. Merge stability relies on this order.
    pub fn all() -> &'static [Chain] {
        &[Chain::Primary, Chain::Secondary]
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::Primary => write!(f, "primary"),
            Chain::Secondary => write!(f, "secondary"),
        }
    }
}

/// A value held once per chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerChain<T> {
    pub primary: T,
    pub secondary: T,
}

impl<T> PerChain<T> {
    pub fn new(primary: T, secondary: T) -> Self {
        Self { primary, secondary }
    }

    pub fn get(&self, chain: Chain) -> &T {
        match chain {
            Chain::Primary => &self.primary,
            Chain::Secondary => &self.secondary,
        }
    }

    pub fn get_mut(&mut self, chain: Chain) -> &mut T {
        match chain {
            Chain::Primary => &mut self.primary,
            Chain::Secondary => &mut self.secondary,
        }
    }

    pub fn set(&mut self, chain: Chain, value: T) {
        *self.get_mut(chain) = value;
    }

    pub fn map<U>(self, mut f: impl FnMut(Chain, T) -> U) -> PerChain<U> {
        PerChain {
            primary: f(Chain::Primary, self.primary),
            secondary: f(Chain::Secondary, self.secondary),
        }
    }
}

/// Which chains are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChainFilter {
    #[default]
    All,
    Primary,
    Secondary,
}

impl ChainFilter {
    pub fn includes(&self, chain: Chain) -> bool {
        match self {
            ChainFilter::All => true,
            ChainFilter::Primary => chain == Chain::Primary,
            ChainFilter::Secondary => chain == Chain::Secondary,
        }
    }

    /// The single chain this filter narrows to, if any.
    pub fn single(&self) -> Option<Chain> {
        match self {
            ChainFilter::All => None,
            ChainFilter::Primary => Some(Chain::Primary),
            ChainFilter::Secondary => Some(Chain::Secondary),
        }
    }
}

impl From<Chain> for ChainFilter {
    fn from(chain: Chain) -> Self {
        match chain {
            Chain::Primary => ChainFilter::Primary,
            Chain::Secondary => ChainFilter::Secondary,
        }
    }
}

/// Which lists are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Overview,
    Blocks,
    Transactions,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Overview => "Overview",
            ViewMode::Blocks => "Blocks",
            ViewMode::Transactions => "Transactions",
        }
    }

    pub fn shows_blocks(&self) -> bool {
        matches!(self, ViewMode::Overview | ViewMode::Blocks)
    }

    pub fn shows_transactions(&self) -> bool {
        matches!(self, ViewMode::Overview | ViewMode::Transactions)
    }
}

/// Counters reported by the registry for one chain.
///
/// Replaced wholesale on every successful poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStats {
    pub total_blocks: u64,
    pub total_transactions: u64,
    /// Chain tip as seen by the indexer, when reported.
    pub latest_block: Option<u64>,
    /// Whether the indexer reports itself caught up, when reported.
    pub synced: Option<bool>,
}

impl ChainStats {
    /// Blocks the indexer still has to store, when the tip is known.
    pub fn lag(&self) -> Option<u64> {
        self.latest_block
            .map(|tip| tip.saturating_sub(self.total_blocks))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSummary {
    pub chain: Chain,
    pub height: u64,
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub tx_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub chain: Chain,
    pub hash: String,
    /// Decimal amount in the chain's base unit (satoshi, wei).
    pub value: String,
    pub timestamp: DateTime<Utc>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub height: Option<u64>,
}

/// A block with its transactions, fetched on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDetail {
    pub summary: BlockSummary,
    pub transactions: Vec<TransactionDetail>,
}

/// A transaction plus whatever extra fields the registry returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub summary: TransactionSummary,
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Anything that can be placed on the merged timeline.
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

impl Timestamped for BlockSummary {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl Timestamped for TransactionSummary {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Kind of item a detail view can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Block,
    Transaction,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Block => "Block",
            ItemKind::Transaction => "Transaction",
        }
    }
}

/// Identifies the item a detail view was opened for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub kind: ItemKind,
    pub chain: Chain,
    pub identifier: String,
}

impl SelectionKey {
    pub fn block(chain: Chain, hash: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Block,
            chain,
            identifier: hash.into(),
        }
    }

    pub fn transaction(chain: Chain, hash: impl Into<String>) -> Self {
        Self {
            kind: ItemKind::Transaction,
            chain,
            identifier: hash.into(),
        }
    }
}

/// Coarse classification of a failed remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network error, timeout or server-side failure.
    Transport,
    /// The request was valid but nothing matched.
    NotFound,
    /// The response did not have the expected shape.
    MalformedResponse,
}

/// Typed description of a failed fetch, carried back into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Transport, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureKind::NotFound, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FailureKind::MalformedResponse, message)
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_filter_includes() {
        assert!(ChainFilter::All.includes(Chain::Primary));
        assert!(ChainFilter::All.includes(Chain::Secondary));
        assert!(ChainFilter::Primary.includes(Chain::Primary));
        assert!(!ChainFilter::Primary.includes(Chain::Secondary));
        assert!(!ChainFilter::Secondary.includes(Chain::Primary));
    }

    #[test]
    fn test_chain_filter_single() {
        assert_eq!(ChainFilter::All.single(), None);
        assert_eq!(ChainFilter::from(Chain::Secondary).single(), Some(Chain::Secondary));
    }

    #[test]
    fn test_per_chain_access() {
        let mut pc = PerChain::new(1, 2);
        assert_eq!(*pc.get(Chain::Primary), 1);
        pc.set(Chain::Secondary, 5);
        assert_eq!(*pc.get(Chain::Secondary), 5);
        let doubled = pc.map(|_, v| v * 2);
        assert_eq!(doubled, PerChain::new(2, 10));
    }

    #[test]
    fn test_view_mode_visibility() {
        assert!(ViewMode::Overview.shows_blocks());
        assert!(ViewMode::Overview.shows_transactions());
        assert!(!ViewMode::Blocks.shows_transactions());
        assert!(!ViewMode::Transactions.shows_blocks());
    }

    #[test]
    fn test_stats_lag() {
        let stats = ChainStats {
            total_blocks: 90,
            total_transactions: 0,
            latest_block: Some(100),
            synced: Some(false),
        };
        assert_eq!(stats.lag(), Some(10));
        assert_eq!(ChainStats::default().lag(), None);
    }
}
