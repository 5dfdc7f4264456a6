//! Cross-chain merge of independently fetched lists.

use crate::types::Timestamped;

/// Interleave two chains' lists into one timeline, most recent first.
///
/// Items with equal timestamps keep their order from `primary` followed by
/// `secondary`. Inputs may have any length, including zero.
pub fn merge_by_time<T>(primary: &[T], secondary: &[T]) -> Vec<T>
where
    T: Timestamped + Clone,
{
    let mut merged: Vec<T> = Vec::with_capacity(primary.len() + secondary.len());
    merged.extend_from_slice(primary);
    merged.extend_from_slice(secondary);
    // sort_by is stable, so ties keep concatenation order
    merged.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
    merged
}
