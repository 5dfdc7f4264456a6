//! Search override bookkeeping.
//!
//! The view flags (`is_searching`, `search_query`) live on `ViewState`; this
//! module tracks which search request is current and how it ended.

use crate::types::FetchFailure;

/// Tracks the live search request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    epoch: u64,
    in_flight: bool,
    error: Option<FetchFailure>,
}

impl SearchState {
    /// Start a new search and return its epoch. Any older epoch becomes stale.
    pub fn begin(&mut self) -> u64 {
        self.epoch += 1;
        self.in_flight = true;
        self.error = None;
        self.epoch
    }

    /// Abandon whatever search is running.
    pub fn cancel(&mut self) {
        self.epoch += 1;
        self.in_flight = false;
        self.error = None;
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Set when the last search failed. Distinguishes failure from zero matches.
    pub fn error(&self) -> Option<&FetchFailure> {
        self.error.as_ref()
    }

    pub(crate) fn succeed(&mut self) {
        self.in_flight = false;
        self.error = None;
    }

    pub(crate) fn fail(&mut self, failure: FetchFailure) {
        self.in_flight = false;
        self.error = Some(failure);
    }
}

/// Trimmed query, or `None` when nothing is left to search for.
pub fn normalize_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
