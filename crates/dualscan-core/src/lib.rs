//! Core state engine for a dual-chain block explorer.
//!
//! This crate provides:
//! - Domain types (`types` module)
//! - The time-ordered cross-chain merge (`merge` module)
//! - Pagination and view-mode state (`view` module)
//! - Search and detail request tracking (`search`, `detail` modules)
//! - The `Explorer` engine tying them together (`engine` module)
//! - Formatting helpers for frontends (`display` module)
//!
//! With the `persistence` feature enabled:
//! - Configuration management (`config` module)

pub mod detail;
pub mod display;
pub mod engine;
pub mod merge;
pub mod search;
pub mod types;
pub mod view;

#[cfg(feature = "persistence")]
pub mod config;

pub use detail::*;
pub use display::*;
pub use engine::*;
pub use merge::*;
pub use search::*;
pub use types::*;
pub use view::*;

#[cfg(feature = "persistence")]
pub use config::{AppConfig, ChainProfile, ConfigError};
