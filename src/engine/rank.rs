//! Period ranking: sort entries and assign standard competition ranks.

use crate::engine::types::{RankedEntry, RawEntry};
use std::cmp::Ordering;

/// Orders scores high to low.
///
/// Uses the same equality as the rank assignment, so `0.0` and `-0.0` tie.
pub fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or_else(|| b.total_cmp(&a))
}

/// Orders by score descending, then entrant id ascending.
pub fn by_score_then_id(a_score: f64, a_id: &str, b_score: f64, b_id: &str) -> Ordering {
    descending(a_score, b_score).then_with(|| a_id.cmp(b_id))
}

/// Assigns standard competition ranks ("1224" ranking) over an already
/// sorted sequence.
///
/// An item shares its predecessor's rank only when its key is exactly equal;
/// otherwise it takes its 1-based position, leaving a gap after every tie.
/// Scores `[90, 90, 45]` rank as `[1, 1, 3]`.
pub fn competition_ranks<T>(sorted: &[T], key: impl Fn(&T) -> f64) -> Vec<u32> {
    let mut ranks: Vec<u32> = Vec::with_capacity(sorted.len());

    for (i, item) in sorted.iter().enumerate() {
        let rank = match (i.checked_sub(1), ranks.last()) {
            (Some(prev), Some(&prev_rank)) if key(&sorted[prev]) == key(item) => prev_rank,
            _ => (i + 1) as u32,
        };
        ranks.push(rank);
    }

    ranks
}

/// Sorts one period's entries and ranks them.
///
/// Input is expected to be clean: numeric scores and non-empty ids only.
/// The output has the same length as the input, ordered by rank.
pub fn assign_ranks(mut entries: Vec<RawEntry>) -> Vec<RankedEntry> {
    entries.sort_by(|a, b| by_score_then_id(a.raw_score, &a.entrant_id, b.raw_score, &b.entrant_id));

    let ranks = competition_ranks(&entries, |e| e.raw_score);

    entries
        .into_iter()
        .zip(ranks)
        .map(|(e, rank)| RankedEntry {
            entrant_id: e.entrant_id,
            raw_score: e.raw_score,
            rank,
        })
        .collect()
}
