//! Actions for state updates.

use dualscan_core::{Chain, Outcome, PageDirection, SelectionKey, ViewMode};

/// Everything that can change the explorer session, from the keyboard,
/// the poll scheduler or the registry worker.
#[derive(Debug, Clone)]
pub enum Action {
    /// Poll interval elapsed.
    Poll,
    /// A registry command finished.
    Outcome(Outcome),
    /// Show a single chain's blocks or transactions.
    SelectChainView(Chain, ViewMode),
    /// Back to the combined overview.
    GoHome,
    Paginate(PageDirection),
    SubmitSearch(String),
    ClearSearch,
    TogglePause,
    /// Open the detail panel for one block or transaction.
    SelectItem(SelectionKey),
    CloseDetail,
    /// Quit the application.
    Quit,
}

impl From<Outcome> for Action {
    fn from(outcome: Outcome) -> Self {
        Action::Outcome(outcome)
    }
}
