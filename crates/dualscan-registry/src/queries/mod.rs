//! Registry query implementations.

pub mod blocks;
pub mod search;
pub mod stats;
pub mod transactions;
pub(crate) mod wire;
