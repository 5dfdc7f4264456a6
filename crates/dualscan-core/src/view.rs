//! Pagination and view-mode state machine.
//!
//! `ViewState` is only changed through the named transitions below. Each
//! transition reports whether an immediate list fetch is needed; the engine
//! turns that into a command.

use crate::types::{Chain, ChainFilter, SelectionKey, ViewMode};

/// Page sizes for the combined overview and the single-chain explorer views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizes {
    pub overview: u32,
    pub explorer: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            overview: 8,
            explorer: 15,
        }
    }
}

/// Direction of the shared pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Forward,
    Back,
}

/// `limit`/`offset` pair for one list request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub limit: u32,
    pub offset: u64,
}

impl Window {
    pub fn for_page(page_index: u32, page_size: u32) -> Self {
        Self {
            limit: page_size,
            offset: page_index as u64 * page_size as u64,
        }
    }
}

/// The (filter, page) tuple a list fetch was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub filter: ChainFilter,
    pub blocks_page: u32,
    pub txs_page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Chains excluded by the filter get no request and an empty list.
    pub fn includes(&self, chain: Chain) -> bool {
        self.filter.includes(chain)
    }

    pub fn blocks_window(&self) -> Window {
        Window::for_page(self.blocks_page, self.page_size)
    }

    pub fn transactions_window(&self) -> Window {
        Window::for_page(self.txs_page, self.page_size)
    }

    pub fn is_page_zero(&self) -> bool {
        self.blocks_page == 0 && self.txs_page == 0
    }
}

/// Single source of truth for what the explorer shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    pub active_chain_filter: ChainFilter,
    pub view_mode: ViewMode,
    pub blocks_page_index: u32,
    pub txs_page_index: u32,
    pub is_searching: bool,
    pub search_query: String,
    pub is_paused: bool,
    pub selection: Option<SelectionKey>,
}

impl ViewState {
    /// Initial session state.
    pub fn new(start_paused: bool) -> Self {
        Self {
            is_paused: start_paused,
            ..Self::default()
        }
    }

    /// Whether a scheduler tick may overwrite the visible lists.
    ///
    /// Only page zero is refreshed live, never while search results are shown
    /// and never while the feed is paused.
    pub fn allows_live_refresh(&self) -> bool {
        self.blocks_page_index == 0
            && self.txs_page_index == 0
            && !self.is_searching
            && !self.is_paused
    }

    pub fn page_size(&self, sizes: PageSizes) -> u32 {
        match self.view_mode {
            ViewMode::Overview => sizes.overview,
            ViewMode::Blocks | ViewMode::Transactions => sizes.explorer,
        }
    }

    /// The fetch tuple for what is currently visible.
    pub fn page_request(&self, sizes: PageSizes) -> PageRequest {
        PageRequest {
            filter: self.active_chain_filter,
            blocks_page: self.blocks_page_index,
            txs_page: self.txs_page_index,
            page_size: self.page_size(sizes),
        }
    }

    /// Whether a list result fetched for `request` still describes this state.
    pub fn matches_page(&self, request: &PageRequest, sizes: PageSizes) -> bool {
        !self.is_searching && self.page_request(sizes) == *request
    }

    /// Open a single-chain explorer view. Leaves search mode.
    pub fn select_chain_view(&mut self, chain: Chain, mode: ViewMode) {
        self.active_chain_filter = ChainFilter::from(chain);
        self.view_mode = mode;
        self.reset_pages();
        self.is_searching = false;
    }

    /// Back to the combined overview (logo click).
    pub fn go_home(&mut self) {
        self.active_chain_filter = ChainFilter::All;
        self.view_mode = ViewMode::Overview;
        self.reset_pages();
        self.is_searching = false;
        self.search_query.clear();
    }

    pub fn can_page_back(&self) -> bool {
        !self.is_searching && (self.blocks_page_index > 0 || self.txs_page_index > 0)
    }

    pub fn can_page_forward(&self) -> bool {
        !self.is_searching
    }

    /// Move both pages together. Returns false when the button is disabled.
    pub fn paginate(&mut self, direction: PageDirection) -> bool {
        match direction {
            PageDirection::Forward => {
                if !self.can_page_forward() {
                    return false;
                }
                self.blocks_page_index = self.blocks_page_index.saturating_add(1);
                self.txs_page_index = self.txs_page_index.saturating_add(1);
            }
            PageDirection::Back => {
                if !self.can_page_back() {
                    return false;
                }
                self.blocks_page_index = self.blocks_page_index.saturating_sub(1);
                self.txs_page_index = self.txs_page_index.saturating_sub(1);
            }
        }
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.is_paused = !self.is_paused;
        self.is_paused
    }

    pub(crate) fn enter_search(&mut self, query: &str) {
        self.search_query = query.to_string();
        self.is_searching = true;
        self.reset_pages();
    }

    pub(crate) fn leave_search(&mut self) {
        self.search_query.clear();
        self.is_searching = false;
        self.reset_pages();
    }

    fn reset_pages(&mut self) {
        self.blocks_page_index = 0;
        self.txs_page_index = 0;
    }
}
