//! Formatting helpers shared by frontends.

use chrono::{DateTime, Utc};

/// Safely truncate a string to a maximum number of characters (not bytes).
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else if max_chars <= 3 {
        s.chars().take(max_chars).collect()
    } else {
        let truncated: String = s.chars().take(max_chars - 3).collect();
        format!("{}...", truncated)
    }
}

/// Shorten a hash or address to `prefix...suffix`.
pub fn short_hash(hash: &str, prefix_len: usize, suffix_len: usize) -> String {
    let chars: Vec<char> = hash.chars().collect();
    if chars.len() <= prefix_len + suffix_len + 3 {
        return hash.to_string();
    }
    let head: String = chars[..prefix_len].iter().collect();
    let tail: String = chars[chars.len() - suffix_len..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Relative age such as `12s ago` or `3h ago`. Future timestamps read `just now`.
pub fn format_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - timestamp).num_seconds();
    if secs < 1 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3_600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}

/// Integer with thousands separators.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Largest decimal scale whose divisor still fits in a `u128`.
pub const MAX_AMOUNT_DECIMALS: u8 = 38;

/// Render a decimal base-unit amount in whole units, e.g. satoshi to BTC.
///
/// Values that do not parse as an unsigned integer, or scales above
/// [`MAX_AMOUNT_DECIMALS`], are returned unchanged.
pub fn format_amount(base_units: &str, decimals: u8, symbol: &str) -> String {
    let Ok(raw) = base_units.trim().parse::<u128>() else {
        return base_units.to_string();
    };
    let Some(divisor) = 10u128.checked_pow(decimals as u32) else {
        return base_units.to_string();
    };
    let whole = raw / divisor;
    let frac = raw % divisor;
    if frac == 0 || decimals == 0 {
        return format!("{} {}", whole, symbol);
    }
    let frac = format!("{:0width$}", frac, width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    let frac: String = frac.chars().take(6).collect();
    let frac = frac.trim_end_matches('0');
    match (whole, frac.is_empty()) {
        (0, true) => format!("<0.000001 {}", symbol),
        (_, true) => format!("{} {}", whole, symbol),
        _ => format!("{}.{} {}", whole, frac, symbol),
    }
}
