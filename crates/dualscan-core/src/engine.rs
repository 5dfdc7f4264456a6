//! The explorer engine.
//!
//! `Explorer` is the only writer of explorer state. User intents and
//! scheduler ticks are transitions returning the [`Command`]s to execute;
//! completed commands come back as [`Outcome`]s through [`Explorer::apply`].
//! Outcomes are checked against the state they were requested for and
//! dropped when that state has moved on.

use tracing::{debug, info, warn};

use crate::detail::{DetailRecord, DetailState, DetailTicket, DetailTracker};
use crate::merge::merge_by_time;
use crate::search::{SearchState, normalize_query};
use crate::types::{
    BlockSummary, Chain, ChainStats, FetchFailure, PerChain, SelectionKey, TransactionSummary,
    ViewMode,
};
use crate::view::{PageDirection, PageRequest, PageSizes, ViewState};

/// Who asked for a list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    User,
    Schedule,
}

/// Blocks and transactions for one chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainPage {
    pub blocks: Vec<BlockSummary>,
    pub transactions: Vec<TransactionSummary>,
}

/// Effects requested by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Refresh counters for both chains.
    FetchStats,
    /// Fetch blocks and transactions for every chain the request includes.
    FetchPage {
        request: PageRequest,
        trigger: Trigger,
    },
    /// Run `query` against both chains.
    Search { query: String, epoch: u64 },
    FetchDetail(DetailTicket),
}

/// Completed commands, fed back into [`Explorer::apply`].
#[derive(Debug, Clone)]
pub enum Outcome {
    Stats {
        chain: Chain,
        result: Result<ChainStats, FetchFailure>,
    },
    Page {
        chain: Chain,
        request: PageRequest,
        trigger: Trigger,
        result: Result<ChainPage, FetchFailure>,
    },
    /// Search results for both chains; a failure on either fails the search.
    Search {
        epoch: u64,
        result: Result<PerChain<ChainPage>, FetchFailure>,
    },
    Detail {
        ticket: DetailTicket,
        result: Result<DetailRecord, FetchFailure>,
    },
}

/// Read-only view of the engine handed to the frontend.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub view: ViewState,
    pub stats: PerChain<Option<ChainStats>>,
    /// Both chains merged, most recent first.
    pub blocks: Vec<BlockSummary>,
    pub transactions: Vec<TransactionSummary>,
    /// Hashes of blocks that arrived with the latest live refresh.
    pub new_heads: Vec<String>,
    pub lists_loading: bool,
    pub list_error: Option<FetchFailure>,
    pub search_loading: bool,
    pub search_error: Option<FetchFailure>,
    pub detail: DetailState,
    pub can_page_back: bool,
    pub can_page_forward: bool,
    pub page_size: u32,
}

impl Snapshot {
    pub fn is_new_head(&self, hash: &str) -> bool {
        self.new_heads.iter().any(|h| h == hash)
    }
}

#[derive(Debug, Clone)]
pub struct Explorer {
    view: ViewState,
    sizes: PageSizes,
    stats: PerChain<Option<ChainStats>>,
    blocks: PerChain<Vec<BlockSummary>>,
    transactions: PerChain<Vec<TransactionSummary>>,
    new_heads: PerChain<Vec<String>>,
    lists_loading: PerChain<bool>,
    list_errors: PerChain<Option<FetchFailure>>,
    search: SearchState,
    detail: DetailTracker,
}

impl Explorer {
    pub fn new(sizes: PageSizes, start_paused: bool) -> Self {
        Self {
            view: ViewState::new(start_paused),
            sizes,
            stats: PerChain::default(),
            blocks: PerChain::default(),
            transactions: PerChain::default(),
            new_heads: PerChain::default(),
            lists_loading: PerChain::default(),
            list_errors: PerChain::default(),
            search: SearchState::default(),
            detail: DetailTracker::default(),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn stats(&self, chain: Chain) -> Option<&ChainStats> {
        self.stats.get(chain).as_ref()
    }

    pub fn blocks(&self, chain: Chain) -> &[BlockSummary] {
        self.blocks.get(chain)
    }

    pub fn transactions(&self, chain: Chain) -> &[TransactionSummary] {
        self.transactions.get(chain)
    }

    pub fn detail(&self) -> &DetailState {
        self.detail.state()
    }

    pub fn search_error(&self) -> Option<&FetchFailure> {
        self.search.error()
    }

    /// The first chain whose user-triggered page fetch failed, if any.
    pub fn list_error(&self) -> Option<&FetchFailure> {
        Chain::all()
            .iter()
            .find_map(|&chain| self.list_errors.get(chain).as_ref())
    }

    /// Initial load: stats plus the first page.
    pub fn start(&mut self) -> Vec<Command> {
        info!("Explorer session started");
        vec![Command::FetchStats, self.fetch_current_page()]
    }

    /// One scheduler interval elapsed.
    pub fn tick(&self) -> Vec<Command> {
        let mut commands = vec![Command::FetchStats];
        if self.view.allows_live_refresh() {
            commands.push(Command::FetchPage {
                request: self.view.page_request(self.sizes),
                trigger: Trigger::Schedule,
            });
        } else {
            debug!(
                paused = self.view.is_paused,
                searching = self.view.is_searching,
                "Live list refresh skipped"
            );
        }
        commands
    }

    pub fn select_chain_view(&mut self, chain: Chain, mode: ViewMode) -> Vec<Command> {
        info!("Switching to {} {}", chain, mode.label());
        self.search.cancel();
        self.view.select_chain_view(chain, mode);
        vec![self.fetch_current_page()]
    }

    pub fn go_home(&mut self) -> Vec<Command> {
        info!("Returning to overview");
        self.search.cancel();
        self.view.go_home();
        vec![self.fetch_current_page()]
    }

    pub fn paginate(&mut self, direction: PageDirection) -> Vec<Command> {
        if !self.view.paginate(direction) {
            debug!(?direction, "Pager disabled");
            return Vec::new();
        }
        vec![self.fetch_current_page()]
    }

    /// Submit a search. A blank query clears search instead.
    pub fn submit_search(&mut self, query: &str) -> Vec<Command> {
        let Some(query) = normalize_query(query) else {
            return self.clear_search();
        };
        info!("Searching for '{}'", query);
        self.view.enter_search(query);
        self.list_errors = PerChain::default();
        self.lists_loading = PerChain::default();
        self.new_heads = PerChain::default();
        let epoch = self.search.begin();
        vec![Command::Search {
            query: query.to_string(),
            epoch,
        }]
    }

    pub fn clear_search(&mut self) -> Vec<Command> {
        if self.view.is_searching {
            info!("Search cleared");
        }
        self.search.cancel();
        self.view.leave_search();
        vec![self.fetch_current_page()]
    }

    /// Flip the live feed. Takes effect on the next tick.
    pub fn toggle_pause(&mut self) -> Vec<Command> {
        let paused = self.view.toggle_pause();
        info!("Live feed {}", if paused { "paused" } else { "resumed" });
        Vec::new()
    }

    pub fn select_item(&mut self, key: SelectionKey) -> Vec<Command> {
        debug!(chain = %key.chain, id = %key.identifier, "Opening {} detail", key.kind.label());
        self.view.selection = Some(key.clone());
        let ticket = self.detail.select(key);
        vec![Command::FetchDetail(ticket)]
    }

    pub fn close_detail(&mut self) -> Vec<Command> {
        self.view.selection = None;
        self.detail.close();
        Vec::new()
    }

    /// Fold a completed command into the state.
    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Stats { chain, result } => match result {
                Ok(stats) => self.stats.set(chain, Some(stats)),
                Err(failure) => {
                    warn!("Stats refresh for {} failed: {}", chain, failure);
                }
            },
            Outcome::Page {
                chain,
                request,
                trigger,
                result,
            } => self.apply_page(chain, request, trigger, result),
            Outcome::Search { epoch, result } => self.apply_search(epoch, result),
            Outcome::Detail { ticket, result } => {
                if !self.detail.resolve(&ticket, result) {
                    debug!(
                        generation = ticket.generation,
                        id = %ticket.key.identifier,
                        "Dropping stale detail result"
                    );
                }
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut new_heads = self.new_heads.primary.clone();
        new_heads.extend(self.new_heads.secondary.iter().cloned());
        Snapshot {
            view: self.view.clone(),
            stats: self.stats.clone(),
            blocks: merge_by_time(&self.blocks.primary, &self.blocks.secondary),
            transactions: merge_by_time(&self.transactions.primary, &self.transactions.secondary),
            new_heads,
            lists_loading: self.lists_loading.primary || self.lists_loading.secondary,
            list_error: self.list_error().cloned(),
            search_loading: self.search.in_flight(),
            search_error: self.search.error().cloned(),
            detail: self.detail.state().clone(),
            can_page_back: self.view.can_page_back(),
            can_page_forward: self.view.can_page_forward(),
            page_size: self.view.page_size(self.sizes),
        }
    }

    /// User-triggered fetch for the visible tuple. Excluded chains are emptied here.
    fn fetch_current_page(&mut self) -> Command {
        let request = self.view.page_request(self.sizes);
        self.list_errors = PerChain::default();
        self.new_heads = PerChain::default();
        for &chain in Chain::all() {
            if request.includes(chain) {
                self.lists_loading.set(chain, true);
            } else {
                self.lists_loading.set(chain, false);
                self.blocks.get_mut(chain).clear();
                self.transactions.get_mut(chain).clear();
            }
        }
        Command::FetchPage {
            request,
            trigger: Trigger::User,
        }
    }

    fn apply_page(
        &mut self,
        chain: Chain,
        request: PageRequest,
        trigger: Trigger,
        result: Result<ChainPage, FetchFailure>,
    ) {
        let current = match trigger {
            Trigger::User => self.view.matches_page(&request, self.sizes),
            Trigger::Schedule => {
                self.view.allows_live_refresh() && self.view.matches_page(&request, self.sizes)
            }
        };
        if !current || !request.includes(chain) {
            debug!(%chain, ?trigger, "Dropping stale page result");
            return;
        }

        match (result, trigger) {
            (Ok(page), Trigger::Schedule) => {
                let heads = fresh_heads(self.blocks.get(chain), &page.blocks);
                if !heads.is_empty() {
                    debug!("{} new {} block(s)", heads.len(), chain);
                }
                self.new_heads.set(chain, heads);
                self.list_errors.set(chain, None);
                self.store_page(chain, page);
            }
            (Ok(page), Trigger::User) => {
                self.lists_loading.set(chain, false);
                self.list_errors.set(chain, None);
                self.store_page(chain, page);
            }
            (Err(failure), Trigger::Schedule) => {
                warn!("Live refresh for {} failed: {}", chain, failure);
            }
            (Err(failure), Trigger::User) => {
                warn!("Page fetch for {} failed: {}", chain, failure);
                self.lists_loading.set(chain, false);
                self.store_page(chain, ChainPage::default());
                self.list_errors.set(chain, Some(failure));
            }
        }
    }

    fn apply_search(&mut self, epoch: u64, result: Result<PerChain<ChainPage>, FetchFailure>) {
        if !self.view.is_searching || !self.search.is_current(epoch) {
            debug!(epoch, "Dropping stale search result");
            return;
        }
        match result {
            Ok(pages) => {
                let PerChain { primary, secondary } = pages;
                info!(
                    "Search matched {} block(s) and {} transaction(s)",
                    primary.blocks.len() + secondary.blocks.len(),
                    primary.transactions.len() + secondary.transactions.len()
                );
                self.store_page(Chain::Primary, primary);
                self.store_page(Chain::Secondary, secondary);
                self.search.succeed();
            }
            Err(failure) => {
                warn!("Search failed: {}", failure);
                self.store_page(Chain::Primary, ChainPage::default());
                self.store_page(Chain::Secondary, ChainPage::default());
                self.search.fail(failure);
            }
        }
    }

    fn store_page(&mut self, chain: Chain, page: ChainPage) {
        self.blocks.set(chain, page.blocks);
        self.transactions.set(chain, page.transactions);
    }
}

/// Hashes at the head of `incoming` that sit above the previous top block.
fn fresh_heads(previous: &[BlockSummary], incoming: &[BlockSummary]) -> Vec<String> {
    let Some(top) = previous.first() else {
        return Vec::new();
    };
    incoming
        .iter()
        .take_while(|block| block.hash != top.hash)
        .map(|block| block.hash.clone())
        .collect()
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Intent {
        Forward,
        Back,
        Search,
        Clear,
        Pause,
        Home,
    }

    fn intent() -> impl Strategy<Value = Intent> {
        prop_oneof![
            Just(Intent::Forward),
            Just(Intent::Back),
            Just(Intent::Search),
            Just(Intent::Clear),
            Just(Intent::Pause),
            Just(Intent::Home),
        ]
    }

    proptest! {
        #[test]
        fn test_ticks_never_fetch_lists_while_searching(
            intents in prop::collection::vec(intent(), 0..60)
        ) {
            let mut ex = Explorer::new(PageSizes::default(), false);
            for intent in intents {
                match intent {
                    Intent::Forward => { ex.paginate(PageDirection::Forward); }
                    Intent::Back => { ex.paginate(PageDirection::Back); }
                    Intent::Search => { ex.submit_search("abc"); }
                    Intent::Clear => { ex.clear_search(); }
                    Intent::Pause => { ex.toggle_pause(); }
                    Intent::Home => { ex.go_home(); }
                }
                let view = ex.view();
                prop_assert_eq!(view.blocks_page_index, view.txs_page_index);
                let fetches_lists = ex
                    .tick()
                    .iter()
                    .any(|c| matches!(c, Command::FetchPage { .. }));
                prop_assert_eq!(fetches_lists, view.allows_live_refresh());
                if view.is_searching || view.is_paused {
                    prop_assert!(!fetches_lists);
                }
            }
        }
    }
}
