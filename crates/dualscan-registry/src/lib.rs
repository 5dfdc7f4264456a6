//! Remote registry access for the explorer.
//!
//! - `client`: HTTP client and the `Registry` trait
//! - `queries`: one module per registry endpoint family
//! - `worker`: executes engine commands and reports outcomes
//! - `scheduler`: the fixed-interval poll timer

pub mod client;
pub mod config;
pub mod error;
pub mod queries;
pub mod scheduler;
pub mod worker;

pub use client::*;
pub use config::*;
pub use error::*;
pub use scheduler::PollScheduler;
pub use worker::{execute, registry_task};
