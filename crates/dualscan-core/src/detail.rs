//! Detail fetch lifecycle: `Idle -> Loading -> Loaded | Errored`.
//!
//! Every fetch carries a [`DetailTicket`]. A completion is applied only when
//! its ticket is still the live one, so closing the view or selecting another
//! item makes older completions inert.

use crate::types::{BlockDetail, FailureKind, FetchFailure, SelectionKey, TransactionDetail};

/// Payload of a loaded detail view.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailRecord {
    Block(BlockDetail),
    Transaction(TransactionDetail),
}

/// Why a detail view could not be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailFailureReason {
    NotFound,
    Unreachable,
    Malformed,
}

impl DetailFailureReason {
    pub fn label(&self) -> &'static str {
        match self {
            DetailFailureReason::NotFound => "Not found",
            DetailFailureReason::Unreachable => "Registry unreachable",
            DetailFailureReason::Malformed => "Unexpected response",
        }
    }
}

impl From<FailureKind> for DetailFailureReason {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::NotFound => DetailFailureReason::NotFound,
            FailureKind::Transport => DetailFailureReason::Unreachable,
            FailureKind::MalformedResponse => DetailFailureReason::Malformed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailState {
    #[default]
    Idle,
    Loading(SelectionKey),
    Loaded(SelectionKey, DetailRecord),
    Errored {
        key: SelectionKey,
        reason: DetailFailureReason,
        message: String,
    },
}

impl DetailState {
    pub fn key(&self) -> Option<&SelectionKey> {
        match self {
            DetailState::Idle => None,
            DetailState::Loading(key) | DetailState::Loaded(key, _) => Some(key),
            DetailState::Errored { key, .. } => Some(key),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DetailState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DetailState::Loading(_))
    }
}

/// Identifies one detail request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    pub key: SelectionKey,
    pub generation: u64,
}

/// Owns the detail state and the current request generation.
#[derive(Debug, Clone, Default)]
pub struct DetailTracker {
    state: DetailState,
    generation: u64,
}

impl DetailTracker {
    pub fn state(&self) -> &DetailState {
        &self.state
    }

    /// Enter `Loading` for `key`, dropping whatever was shown before.
    pub fn select(&mut self, key: SelectionKey) -> DetailTicket {
        self.generation += 1;
        self.state = DetailState::Loading(key.clone());
        DetailTicket {
            key,
            generation: self.generation,
        }
    }

    pub fn close(&mut self) {
        self.generation += 1;
        self.state = DetailState::Idle;
    }

    /// Whether `ticket` belongs to the request the view is waiting on.
    pub fn is_current(&self, ticket: &DetailTicket) -> bool {
        ticket.generation == self.generation
            && matches!(&self.state, DetailState::Loading(key) if *key == ticket.key)
    }

    /// Apply a completion. Returns false when the ticket is stale.
    pub fn resolve(
        &mut self,
        ticket: &DetailTicket,
        result: Result<DetailRecord, FetchFailure>,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        let key = ticket.key.clone();
        self.state = match result {
            Ok(record) => DetailState::Loaded(key, record),
            Err(failure) => DetailState::Errored {
                key,
                reason: failure.kind.into(),
                message: failure.message,
            },
        };
        true
    }
}
