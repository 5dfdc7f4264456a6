//! Plain-text snapshot for `--once`, suitable for pipes and cron jobs.

use chrono::{DateTime, Utc};
use dualscan_core::{
    Chain, ChainProfile, PerChain, Snapshot, format_age, format_amount, format_count, short_hash,
};
use std::fmt::Write as _;

pub fn render_report(
    snapshot: &Snapshot,
    profiles: &PerChain<ChainProfile>,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    for &chain in Chain::all() {
        let profile = profiles.get(chain);
        let _ = write!(out, "{:<5}{:<10}", profile.symbol, profile.label);
        match snapshot.stats.get(chain) {
            Some(stats) => {
                let _ = write!(
                    out,
                    "blocks {}  txs {}",
                    format_count(stats.total_blocks),
                    format_count(stats.total_transactions)
                );
                if let Some(lag) = stats.lag().filter(|&lag| lag > 0) {
                    let _ = write!(out, "  ({} behind)", format_count(lag));
                }
                out.push('\n');
            }
            None => out.push_str("stats unavailable\n"),
        }
    }

    if let Some(failure) = &snapshot.list_error {
        let _ = writeln!(out, "\nLists unavailable: {}", failure);
        return out;
    }

    out.push_str("\nLatest blocks\n");
    let _ = writeln!(out, "{:<6}{:>14}  {:<22}{:>6}  {}", "CHAIN", "HEIGHT", "HASH", "TXS", "AGE");
    for block in &snapshot.blocks {
        let _ = writeln!(
            out,
            "{:<6}{:>14}  {:<22}{:>6}  {}",
            profiles.get(block.chain).symbol,
            format_count(block.height),
            short_hash(&block.hash, 10, 8),
            block
                .tx_count
                .map(format_count)
                .unwrap_or_else(|| "-".to_string()),
            format_age(block.timestamp, now)
        );
    }

    out.push_str("\nLatest transactions\n");
    let _ = writeln!(out, "{:<6}{:<22}{:>24}  {}", "CHAIN", "HASH", "VALUE", "AGE");
    for tx in &snapshot.transactions {
        let profile = profiles.get(tx.chain);
        let _ = writeln!(
            out,
            "{:<6}{:<22}{:>24}  {}",
            profile.symbol,
            short_hash(&tx.hash, 10, 8),
            format_amount(&tx.value, profile.decimals, &profile.symbol),
            format_age(tx.timestamp, now)
        );
    }
    out
}
