//! Application state and logic.
//!
//! [`App`] owns the [`Explorer`] session. Keys become [`Action`]s, actions
//! are folded into the explorer, and the resulting commands go back to the
//! caller for the registry worker. Rendering only reads [`App::snapshot`].

use crate::action::Action;
use crate::log_buffer::LogBuffer;
use crate::theme::{Palette, Theme};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dualscan_core::{
    Chain, ChainProfile, Command, Explorer, PageDirection, PerChain, SelectionKey, Snapshot,
    ViewMode, ViewState,
};
use ratatui::widgets::TableState;

/// Input mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into the search bar.
    Searching,
}

/// Which table the cursor moves in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Blocks,
    Transactions,
}

/// Tabs across the top, in `1`-`4` shortcut order after the overview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Blocks(Chain),
    Transactions(Chain),
}

impl Tab {
    pub fn all() -> [Tab; 5] {
        [
            Tab::Overview,
            Tab::Blocks(Chain::Primary),
            Tab::Transactions(Chain::Primary),
            Tab::Blocks(Chain::Secondary),
            Tab::Transactions(Chain::Secondary),
        ]
    }

    pub fn of(view: &ViewState) -> Tab {
        match (view.active_chain_filter.single(), view.view_mode) {
            (Some(chain), ViewMode::Blocks) => Tab::Blocks(chain),
            (Some(chain), ViewMode::Transactions) => Tab::Transactions(chain),
            _ => Tab::Overview,
        }
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn title(&self, profiles: &PerChain<ChainProfile>) -> String {
        match self {
            Tab::Overview => "Overview".to_string(),
            Tab::Blocks(chain) => format!("{} Blocks", profiles.get(*chain).symbol),
            Tab::Transactions(chain) => format!("{} Txs", profiles.get(*chain).symbol),
        }
    }

    /// The action that switches to this tab.
    pub fn action(&self) -> Action {
        match self {
            Tab::Overview => Action::GoHome,
            Tab::Blocks(chain) => Action::SelectChainView(*chain, ViewMode::Blocks),
            Tab::Transactions(chain) => Action::SelectChainView(*chain, ViewMode::Transactions),
        }
    }
}

pub struct App {
    pub palette: Palette,
    pub profiles: PerChain<ChainProfile>,
    /// Registry base URL, shown in the header.
    pub api_url: String,
    explorer: Explorer,
    /// Refreshed after every action.
    pub snapshot: Snapshot,
    pub input_mode: InputMode,
    pub search_input: String,
    pub focus: Focus,
    pub blocks_table_state: TableState,
    pub txs_table_state: TableState,
    pub log_buffer: LogBuffer,
    /// Lines scrolled up from the newest log entry.
    pub log_scroll: usize,
    pub showing_help: bool,
    pub should_quit: bool,
    tick_count: u64,
}

impl App {
    pub fn new(
        explorer: Explorer,
        profiles: PerChain<ChainProfile>,
        api_url: String,
        log_buffer: LogBuffer,
        theme: Theme,
    ) -> Self {
        let snapshot = explorer.snapshot();
        Self {
            palette: theme.palette(),
            profiles,
            api_url,
            explorer,
            snapshot,
            input_mode: InputMode::default(),
            search_input: String::new(),
            focus: Focus::default(),
            blocks_table_state: TableState::default(),
            txs_table_state: TableState::default(),
            log_buffer,
            log_scroll: 0,
            showing_help: false,
            should_quit: false,
            tick_count: 0,
        }
    }

    /// Commands for the initial load.
    pub fn start(&mut self) -> Vec<Command> {
        let commands = self.explorer.start();
        self.refresh();
        commands
    }

    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    pub fn spinner_char(&self) -> char {
        const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        SPINNER_CHARS[(self.tick_count as usize) % SPINNER_CHARS.len()]
    }

    pub fn tab(&self) -> Tab {
        Tab::of(&self.snapshot.view)
    }

    pub fn profile(&self, chain: Chain) -> &ChainProfile {
        self.profiles.get(chain)
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }
        match self.input_mode {
            InputMode::Searching => self.handle_search_key(key),
            InputMode::Normal if self.snapshot.detail.is_open() => self.handle_detail_key(key),
            InputMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.showing_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter) {
                self.showing_help = false;
            }
            return None;
        }

        let is_searching = self.snapshot.view.is_searching;
        let mode = self.snapshot.view.view_mode;
        match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('?') => {
                self.showing_help = true;
                None
            }
            KeyCode::Char('/') => {
                self.search_input = self.snapshot.view.search_query.clone();
                self.input_mode = InputMode::Searching;
                None
            }
            KeyCode::Esc if is_searching => Some(Action::ClearSearch),
            KeyCode::Esc if self.tab() != Tab::Overview => Some(Action::GoHome),
            KeyCode::Char('0') | KeyCode::Char('h') | KeyCode::Home => Some(Action::GoHome),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c.to_digit(10).unwrap_or(0) as usize;
                Some(Tab::all()[index].action())
            }
            KeyCode::Tab => {
                let tabs = Tab::all();
                Some(tabs[(self.tab().index() + 1) % tabs.len()].action())
            }
            KeyCode::BackTab => {
                let tabs = Tab::all();
                Some(tabs[(self.tab().index() + tabs.len() - 1) % tabs.len()].action())
            }
            KeyCode::Char(' ') | KeyCode::Char('p') => Some(Action::TogglePause),
            KeyCode::Right | KeyCode::Char(']') if self.snapshot.can_page_forward => {
                Some(Action::Paginate(PageDirection::Forward))
            }
            KeyCode::Left | KeyCode::Char('[') if self.snapshot.can_page_back => {
                Some(Action::Paginate(PageDirection::Back))
            }
            KeyCode::Char('f') if mode == ViewMode::Overview => {
                self.focus = match self.focus {
                    Focus::Blocks => Focus::Transactions,
                    Focus::Transactions => Focus::Blocks,
                };
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(1);
                None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(-1);
                None
            }
            KeyCode::Enter => self.focused_key().map(Action::SelectItem),
            KeyCode::PageUp => {
                let max = self.log_buffer.len().saturating_sub(1);
                self.log_scroll = (self.log_scroll + 5).min(max);
                None
            }
            KeyCode::PageDown => {
                self.log_scroll = self.log_scroll.saturating_sub(5);
                None
            }
            _ => None,
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                self.input_mode = InputMode::Normal;
                Some(Action::SubmitSearch(self.search_input.clone()))
            }
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.search_input.clear();
                self.snapshot.view.is_searching.then_some(Action::ClearSearch)
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                None
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                None
            }
            _ => None,
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                Some(Action::CloseDetail)
            }
            _ => None,
        }
    }

    /// Fold an action into the session. Returns commands for the registry worker.
    pub fn handle_action(&mut self, action: Action) -> Vec<Command> {
        let commands = match action {
            Action::Poll => self.explorer.tick(),
            Action::Outcome(outcome) => {
                self.explorer.apply(outcome);
                Vec::new()
            }
            Action::SelectChainView(chain, mode) => {
                self.reset_cursors();
                self.focus = match mode {
                    ViewMode::Transactions => Focus::Transactions,
                    ViewMode::Overview | ViewMode::Blocks => Focus::Blocks,
                };
                self.explorer.select_chain_view(chain, mode)
            }
            Action::GoHome => {
                self.reset_cursors();
                self.search_input.clear();
                self.explorer.go_home()
            }
            Action::Paginate(direction) => {
                self.reset_cursors();
                self.explorer.paginate(direction)
            }
            Action::SubmitSearch(query) => {
                self.reset_cursors();
                self.explorer.submit_search(&query)
            }
            Action::ClearSearch => {
                self.reset_cursors();
                self.search_input.clear();
                self.explorer.clear_search()
            }
            Action::TogglePause => self.explorer.toggle_pause(),
            Action::SelectItem(key) => self.explorer.select_item(key),
            Action::CloseDetail => self.explorer.close_detail(),
            Action::Quit => {
                self.should_quit = true;
                Vec::new()
            }
        };
        self.refresh();
        commands
    }

    fn refresh(&mut self) {
        self.snapshot = self.explorer.snapshot();

        let mode = self.snapshot.view.view_mode;
        if !mode.shows_blocks() {
            self.focus = Focus::Transactions;
        } else if !mode.shows_transactions() {
            self.focus = Focus::Blocks;
        }

        let blocks_len = self.visible_blocks_len();
        clamp_cursor(&mut self.blocks_table_state, blocks_len);
        let txs_len = self.visible_transactions_len();
        clamp_cursor(&mut self.txs_table_state, txs_len);
    }

    fn visible_blocks_len(&self) -> usize {
        if self.snapshot.view.view_mode.shows_blocks() {
            self.snapshot.blocks.len()
        } else {
            0
        }
    }

    fn visible_transactions_len(&self) -> usize {
        if self.snapshot.view.view_mode.shows_transactions() {
            self.snapshot.transactions.len()
        } else {
            0
        }
    }

    fn reset_cursors(&mut self) {
        self.blocks_table_state = TableState::default();
        self.txs_table_state = TableState::default();
    }

    fn move_cursor(&mut self, delta: isize) {
        let (state, len) = match self.focus {
            Focus::Blocks => (&mut self.blocks_table_state, self.snapshot.blocks.len()),
            Focus::Transactions => (&mut self.txs_table_state, self.snapshot.transactions.len()),
        };
        if len == 0 {
            return;
        }
        let current = state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len as isize) as usize;
        state.select(Some(next));
    }

    /// The row under the cursor in the focused table.
    pub fn focused_key(&self) -> Option<SelectionKey> {
        match self.focus {
            Focus::Blocks => {
                let block = self.snapshot.blocks.get(self.blocks_table_state.selected()?)?;
                Some(SelectionKey::block(block.chain, block.hash.clone()))
            }
            Focus::Transactions => {
                let tx = self
                    .snapshot
                    .transactions
                    .get(self.txs_table_state.selected()?)?;
                Some(SelectionKey::transaction(tx.chain, tx.hash.clone()))
            }
        }
    }
}

fn clamp_cursor(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        state.select(Some(state.selected().unwrap_or(0).min(len - 1)));
    }
}
