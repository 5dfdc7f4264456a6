//! UI rendering.

use crate::app::{App, Focus, InputMode, Tab};
use crate::log_buffer::LogLevel;
use crate::theme::Palette;
use chrono::{DateTime, Utc};
use dualscan_core::{
    BlockDetail, Chain, ChainProfile, DetailRecord, DetailState, Snapshot, TransactionDetail,
    TransactionSummary, ViewState, format_age, format_amount, format_count, short_hash,
    truncate_str,
};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
};

/// Visible log lines in the bottom pane.
const LOG_LINES: usize = 6;

/// Transactions listed inside the block detail panel.
const DETAIL_TX_LIMIT: usize = 12;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &mut App) {
    let now = Utc::now();
    let show_search = app.input_mode == InputMode::Searching || app.snapshot.view.is_searching;

    let chunks = Layout::vertical([
        Constraint::Length(4), // Header, one line per chain
        Constraint::Length(3), // Tabs
        Constraint::Length(if show_search { 3 } else { 0 }),
        Constraint::Min(0),                         // Tables
        Constraint::Length(LOG_LINES as u16 + 2), // Logs
    ])
    .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    if show_search {
        render_search_bar(frame, app, chunks[2]);
    }
    render_content(frame, app, chunks[3], now);
    render_logs(frame, app, chunks[4]);

    if app.snapshot.detail.is_open() {
        render_detail_modal(frame, app, now);
    }
    if app.showing_help {
        render_help_modal(frame, app);
    }
}

/// Label and color for the live feed indicator.
fn feed_status(view: &ViewState, p: &Palette) -> (&'static str, Style) {
    if view.is_searching {
        ("SEARCH", Style::default().fg(p.accent).bold())
    } else if view.is_paused {
        ("PAUSED", Style::default().fg(p.warning).bold())
    } else if view.allows_live_refresh() {
        ("LIVE", Style::default().fg(p.success).bold())
    } else {
        // Paged away from the head; ticks only refresh the counters.
        ("HELD", Style::default().fg(p.muted).bold())
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let (feed, feed_style) = feed_status(&app.snapshot.view, p);

    let lines: Vec<Line> = Chain::all()
        .iter()
        .map(|&chain| stats_line(app, chain))
        .collect();

    let header = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.border))
            .title(" dualscan ")
            .title_top(
                Line::from(Span::styled(format!(" ● {} ", feed), feed_style)).right_aligned(),
            ),
    );

    frame.render_widget(header, area);
}

fn stats_line(app: &App, chain: Chain) -> Line<'static> {
    let p = &app.palette;
    let profile = app.profile(chain);
    let mut spans = vec![
        Span::styled(
            format!("[{}] ", profile.symbol),
            Style::default().fg(p.chain(chain)).bold(),
        ),
        Span::raw(format!("{:<10}", profile.label)),
    ];

    let Some(stats) = app.snapshot.stats.get(chain) else {
        spans.push(Span::styled("waiting for registry", Style::default().fg(p.muted)));
        return Line::from(spans);
    };

    spans.push(Span::raw(format!(
        "  blocks {}  │  txs {}",
        format_count(stats.total_blocks),
        format_count(stats.total_transactions)
    )));
    if let Some(tip) = stats.latest_block {
        spans.push(Span::raw(format!("  │  tip {}", format_count(tip))));
    }
    match (stats.synced, stats.lag()) {
        (Some(true), _) | (None, Some(0)) => {
            spans.push(Span::styled("  ✓ synced", Style::default().fg(p.success)));
        }
        (_, Some(lag)) => {
            spans.push(Span::styled(
                format!("  ⟳ {} behind", format_count(lag)),
                Style::default().fg(p.warning),
            ));
        }
        (Some(false), None) => {
            spans.push(Span::styled("  ⟳ syncing", Style::default().fg(p.warning)));
        }
        (None, None) => {}
    }
    Line::from(spans)
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let titles: Vec<Line> = Tab::all()
        .iter()
        .map(|tab| Line::from(tab.title(&app.profiles)))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(p.border)),
        )
        .select(app.tab().index())
        .style(Style::default().fg(p.tab_inactive))
        .highlight_style(
            Style::default()
                .fg(p.tab_active)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_search_bar(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let snapshot = &app.snapshot;

    let line = if app.input_mode == InputMode::Searching {
        Line::from(vec![
            Span::styled("/ ", Style::default().fg(p.highlight).bold()),
            Span::raw(app.search_input.clone()),
            Span::styled("█", Style::default().fg(p.highlight)),
        ])
    } else {
        let status = if snapshot.search_loading {
            Span::styled(
                format!("  {} searching", app.spinner_char()),
                Style::default().fg(p.muted),
            )
        } else if let Some(failure) = &snapshot.search_error {
            Span::styled(
                format!("  Search failed: {}", failure.message),
                Style::default().fg(p.error),
            )
        } else if snapshot.blocks.is_empty() && snapshot.transactions.is_empty() {
            Span::styled("  No matches", Style::default().fg(p.warning))
        } else {
            Span::styled(
                format!(
                    "  {} block(s), {} transaction(s)",
                    snapshot.blocks.len(),
                    snapshot.transactions.len()
                ),
                Style::default().fg(p.success),
            )
        };
        Line::from(vec![
            Span::raw("Results for "),
            Span::styled(
                format!("'{}'", snapshot.view.search_query),
                Style::default().fg(p.highlight).bold(),
            ),
            status,
        ])
    };

    let title = match app.input_mode {
        InputMode::Searching => " Search | Enter:Submit  Esc:Cancel ",
        InputMode::Normal => " Search | /:Edit  Esc:Clear ",
    };
    let bar = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(p.border))
            .title(title),
    );
    frame.render_widget(bar, area);
}

fn render_content(frame: &mut Frame, app: &mut App, area: Rect, now: DateTime<Utc>) {
    let mode = app.snapshot.view.view_mode;
    match (mode.shows_blocks(), mode.shows_transactions()) {
        (true, true) => {
            let halves =
                Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(area);
            render_blocks(frame, app, halves[0], now);
            render_transactions(frame, app, halves[1], now);
        }
        (true, false) => render_blocks(frame, app, area, now),
        _ => render_transactions(frame, app, area, now),
    }
}

/// Title for a list pane: page number, loading spinner, errors.
fn list_title(app: &App, label: &str, focused: bool) -> Line<'static> {
    let p = &app.palette;
    let snapshot = &app.snapshot;
    let view = &snapshot.view;

    let mut spans = vec![Span::styled(
        format!(" {} ", label),
        if focused {
            Style::default().fg(p.tab_active).bold()
        } else {
            Style::default().fg(p.fg)
        },
    )];
    if view.is_searching {
        spans.push(Span::styled("(search) ", Style::default().fg(p.accent)));
    } else {
        let page = match label {
            "Blocks" => view.blocks_page_index,
            _ => view.txs_page_index,
        };
        spans.push(Span::raw(format!("page {} ", page + 1)));
    }
    if snapshot.lists_loading {
        spans.push(Span::styled(
            format!("{} ", app.spinner_char()),
            Style::default().fg(p.muted),
        ));
    }
    Line::from(spans)
}

/// Bottom border hint for the pager.
fn pager_line(snapshot: &Snapshot, p: &Palette) -> Line<'static> {
    let enabled = |on: bool| {
        if on {
            Style::default().fg(p.highlight)
        } else {
            Style::default().fg(p.muted)
        }
    };
    Line::from(vec![
        Span::styled(" ← prev ", enabled(snapshot.can_page_back)),
        Span::raw("│"),
        Span::styled(" next → ", enabled(snapshot.can_page_forward)),
    ])
    .right_aligned()
}

/// Placeholder text when a list has no rows to show.
fn empty_list_message(snapshot: &Snapshot, noun: &str) -> String {
    if let Some(failure) = &snapshot.list_error {
        format!("Registry unavailable: {}", failure.message)
    } else if snapshot.view.is_searching {
        if snapshot.search_loading {
            "Searching...".to_string()
        } else if snapshot.search_error.is_some() {
            "Search failed".to_string()
        } else {
            format!("No matching {}", noun)
        }
    } else if snapshot.lists_loading {
        "Loading...".to_string()
    } else {
        format!("No {}", noun)
    }
}

fn list_block(app: &App, label: &str, focused: bool) -> Block<'static> {
    let p = &app.palette;
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { p.tab_active } else { p.border }))
        .title(list_title(app, label, focused))
        .title_bottom(pager_line(&app.snapshot, p))
}

fn render_empty(frame: &mut Frame, app: &App, area: Rect, label: &str, noun: &str, focused: bool) {
    let p = &app.palette;
    let message = empty_list_message(&app.snapshot, noun);
    let style = if app.snapshot.list_error.is_some() {
        Style::default().fg(p.error)
    } else {
        Style::default().fg(p.muted)
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(message, style)))
        .block(list_block(app, label, focused))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn highlight_style(p: &Palette, focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(p.selection)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    }
}

fn render_blocks(frame: &mut Frame, app: &mut App, area: Rect, now: DateTime<Utc>) {
    let focused = app.focus == Focus::Blocks;
    if app.snapshot.blocks.is_empty() {
        render_empty(frame, app, area, "Blocks", "blocks", focused);
        return;
    }

    let p = app.palette;
    let rows: Vec<Row> = app
        .snapshot
        .blocks
        .iter()
        .map(|block| {
            let symbol = app.profile(block.chain).symbol.clone();
            let row_style = if app.snapshot.is_new_head(&block.hash) {
                Style::default().fg(p.new_head).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(symbol).style(Style::default().fg(p.chain(block.chain))),
                Cell::from(format_count(block.height)),
                Cell::from(short_hash(&block.hash, 10, 8)),
                Cell::from(
                    block
                        .tx_count
                        .map(format_count)
                        .unwrap_or_else(|| "-".to_string()),
                ),
                Cell::from(format_age(block.timestamp, now)),
            ])
            .style(row_style)
        })
        .collect();

    let header = Row::new(vec!["Chain", "Height", "Hash", "Txs", "Age"])
        .style(Style::default().fg(p.highlight).bold());
    let widths = [
        Constraint::Length(6),
        Constraint::Length(14),
        Constraint::Min(21),
        Constraint::Length(8),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(list_block(app, "Blocks", focused))
        .row_highlight_style(highlight_style(&p, focused))
        .highlight_symbol(if focused { ">> " } else { "   " });

    frame.render_stateful_widget(table, area, &mut app.blocks_table_state);
}

fn party(address: Option<&str>) -> String {
    address
        .map(|a| short_hash(a, 8, 6))
        .unwrap_or_else(|| "-".to_string())
}

fn tx_value(tx: &TransactionSummary, profile: &ChainProfile) -> String {
    format_amount(&tx.value, profile.decimals, &profile.symbol)
}

fn render_transactions(frame: &mut Frame, app: &mut App, area: Rect, now: DateTime<Utc>) {
    let focused = app.focus == Focus::Transactions;
    if app.snapshot.transactions.is_empty() {
        render_empty(frame, app, area, "Transactions", "transactions", focused);
        return;
    }

    let p = app.palette;
    let rows: Vec<Row> = app
        .snapshot
        .transactions
        .iter()
        .map(|tx| {
            let profile = app.profile(tx.chain);
            Row::new(vec![
                Cell::from(profile.symbol.clone()).style(Style::default().fg(p.chain(tx.chain))),
                Cell::from(short_hash(&tx.hash, 10, 8)),
                Cell::from(format!(
                    "{} → {}",
                    party(tx.from.as_deref()),
                    party(tx.to.as_deref())
                )),
                Cell::from(tx_value(tx, profile)),
                Cell::from(format_age(tx.timestamp, now)),
            ])
        })
        .collect();

    let header = Row::new(vec!["Chain", "Hash", "From → To", "Value", "Age"])
        .style(Style::default().fg(p.highlight).bold());
    let widths = [
        Constraint::Length(6),
        Constraint::Length(21),
        Constraint::Min(20),
        Constraint::Length(22),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(list_block(app, "Transactions", focused))
        .row_highlight_style(highlight_style(&p, focused))
        .highlight_symbol(if focused { ">> " } else { "   " });

    frame.render_stateful_widget(table, area, &mut app.txs_table_state);
}

/// Center a `width` x `height` box inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// JSON scalars without quotes, everything else compact.
fn field_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

fn labelled(label: &str, value: String, p: &Palette) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", label), Style::default().fg(p.muted)),
        Span::raw(value),
    ])
}

fn timestamp_text(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!(
        "{} ({})",
        timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        format_age(timestamp, now)
    )
}

fn block_detail_lines(
    detail: &BlockDetail,
    profile: &ChainProfile,
    p: &Palette,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    let summary = &detail.summary;
    let mut lines = vec![
        labelled("Chain", profile.label.clone(), p),
        labelled("Height", format_count(summary.height), p),
        labelled("Hash", summary.hash.clone(), p),
        labelled("Time", timestamp_text(summary.timestamp, now), p),
        labelled(
            "Txs",
            summary
                .tx_count
                .map(format_count)
                .unwrap_or_else(|| "-".to_string()),
            p,
        ),
    ];

    if !detail.transactions.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Transactions",
            Style::default().fg(p.highlight).bold(),
        )));
        for tx in detail.transactions.iter().take(DETAIL_TX_LIMIT) {
            lines.push(Line::from(vec![
                Span::raw(format!("  {}  ", short_hash(&tx.summary.hash, 12, 8))),
                Span::styled(tx_value(&tx.summary, profile), Style::default().fg(p.success)),
            ]));
        }
        let hidden = detail.transactions.len().saturating_sub(DETAIL_TX_LIMIT);
        if hidden > 0 {
            lines.push(Line::from(Span::styled(
                format!("  ... and {} more", hidden),
                Style::default().fg(p.muted),
            )));
        }
    }
    lines
}

fn transaction_detail_lines(
    detail: &TransactionDetail,
    profile: &ChainProfile,
    p: &Palette,
    now: DateTime<Utc>,
) -> Vec<Line<'static>> {
    let summary = &detail.summary;
    let mut lines = vec![
        labelled("Chain", profile.label.clone(), p),
        labelled("Hash", summary.hash.clone(), p),
        labelled(
            "Block",
            summary
                .height
                .map(format_count)
                .unwrap_or_else(|| "pending".to_string()),
            p,
        ),
        labelled("Time", timestamp_text(summary.timestamp, now), p),
        labelled("From", summary.from.clone().unwrap_or_else(|| "-".to_string()), p),
        labelled("To", summary.to.clone().unwrap_or_else(|| "-".to_string()), p),
        labelled("Value", tx_value(summary, profile), p),
    ];
    if !detail.fields.is_empty() {
        lines.push(Line::from(""));
        for (name, value) in &detail.fields {
            lines.push(labelled(&truncate_str(name, 12), field_text(value), p));
        }
    }
    lines
}

fn render_detail_modal(frame: &mut Frame, app: &App, now: DateTime<Utc>) {
    let p = &app.palette;
    let detail = &app.snapshot.detail;
    let Some(key) = detail.key() else {
        return;
    };
    let profile = app.profile(key.chain);

    let lines = match detail {
        DetailState::Idle => return,
        DetailState::Loading(key) => vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    "{} Loading {} {}",
                    app.spinner_char(),
                    key.kind.label(),
                    short_hash(&key.identifier, 12, 8)
                ),
                Style::default().fg(p.accent),
            )),
        ],
        DetailState::Errored {
            key,
            reason,
            message,
        } => vec![
            Line::from(""),
            Line::from(Span::styled(
                reason.label().to_string(),
                Style::default().fg(p.error).bold(),
            )),
            Line::from(""),
            labelled("Looked up", key.identifier.clone(), p),
            labelled("Detail", message.clone(), p),
        ],
        DetailState::Loaded(_, DetailRecord::Block(block)) => {
            block_detail_lines(block, profile, p, now)
        }
        DetailState::Loaded(_, DetailRecord::Transaction(tx)) => {
            transaction_detail_lines(tx, profile, p, now)
        }
    };

    let area = centered(frame.area(), 96, 24);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.chain(key.chain)))
        .title(format!(" {} · {} ", key.kind.label(), profile.symbol))
        .title_style(Style::default().fg(p.accent).bold())
        .title_bottom(Line::from(" Esc:Close ").right_aligned())
        .style(Style::default().bg(p.bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_help_modal(frame: &mut Frame, app: &App) {
    let pal = &app.palette;
    let area = centered(frame.area(), 52, 22);
    frame.render_widget(Clear, area);

    let key_style = Style::default().fg(pal.highlight).bold();
    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(pal.accent).bold()))
    };
    let entry = |keys: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<12}", keys), key_style),
            Span::raw(desc),
        ])
    };

    let lines = vec![
        Line::from(""),
        section("  Views"),
        entry("0 / h", "Overview of both chains"),
        entry("1-4", "Blocks or transactions of one chain"),
        entry("Tab", "Next view"),
        entry("Esc", "Clear search, then back to overview"),
        Line::from(""),
        section("  Lists"),
        entry("↑/k ↓/j", "Move cursor"),
        entry("f", "Switch table (overview)"),
        entry("Enter", "Open detail"),
        entry("← / →", "Previous / next page"),
        entry("Space / p", "Pause or resume live feed"),
        Line::from(""),
        section("  Other"),
        entry("/", "Search hashes and heights"),
        entry("PgUp/PgDn", "Scroll logs"),
        entry("?", "Toggle this help"),
        entry("q", "Quit"),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(pal.border))
        .title(" Help ")
        .style(Style::default().bg(pal.bg));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_logs(frame: &mut Frame, app: &App, area: Rect) {
    let p = &app.palette;
    let logs = app.log_buffer.tail(LOG_LINES, app.log_scroll);

    let mut lines: Vec<Line> = logs
        .iter()
        .map(|log| {
            let level_style = match log.level {
                LogLevel::Trace => Style::default().fg(p.muted),
                LogLevel::Debug => Style::default().fg(p.accent),
                LogLevel::Info => Style::default().fg(p.success),
                LogLevel::Warn => Style::default().fg(p.warning),
                LogLevel::Error => Style::default().fg(p.error),
            };
            let target = log.target.rsplit("::").next().unwrap_or(&log.target);
            Line::from(vec![
                Span::styled(format!("{:5} ", log.level.as_str()), level_style),
                Span::styled(format!("[{}] ", target), Style::default().fg(p.muted)),
                Span::raw(log.message.clone()),
            ])
        })
        .collect();
    while lines.len() < LOG_LINES {
        lines.insert(0, Line::from(""));
    }

    let scroll_info = if app.log_scroll > 0 {
        format!(" [↑{}]", app.log_scroll)
    } else {
        String::new()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(p.border))
        .title(format!(" Logs{} ", scroll_info))
        .title_top(
            Line::from(Span::styled(
                format!(" {} ", app.api_url),
                Style::default().fg(p.muted),
            ))
            .right_aligned(),
        );
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
