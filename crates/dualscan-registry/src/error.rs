//! Error types for registry operations.

use dualscan_core::{FailureKind, FetchFailure};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Registry returned HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid registry configuration: {0}")]
    InvalidConfig(String),
}

impl RegistryError {
    /// Coarse classification used by the explorer engine.
    pub fn kind(&self) -> FailureKind {
        match self {
            RegistryError::NotFound(_) => FailureKind::NotFound,
            RegistryError::MalformedResponse(_) => FailureKind::MalformedResponse,
            RegistryError::Transport(_)
            | RegistryError::Timeout(_)
            | RegistryError::Server { .. }
            | RegistryError::InvalidConfig(_) => FailureKind::Transport,
        }
    }
}

impl From<RegistryError> for FetchFailure {
    fn from(err: RegistryError) -> Self {
        FetchFailure::new(err.kind(), err.to_string())
    }
}
