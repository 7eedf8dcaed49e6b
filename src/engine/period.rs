//! Per-period scoring: standardized score, rank bonus and final score.

use crate::engine::rank::assign_ranks;
use crate::engine::types::{PeriodResult, RankedEntry, RawEntry};
use crate::engine::utility::{max_or_zero, round2};
use tracing::debug;

/// Fixed bonus added to the standardized score for a period rank.
///
/// | Rank   | Bonus |
/// |--------|-------|
/// | 1      | +5    |
/// | 2      | +3    |
/// | 3      | +2    |
/// | 4..=10 | +1    |
/// | > 10   | 0     |
pub fn rank_bonus(rank: u32) -> u8 {
    match rank {
        1 => 5,
        2 => 3,
        3 => 2,
        4..=10 => 1,
        _ => 0,
    }
}

/// Rescales `raw_score` against the period's top score onto 0..=100.
/// A period whose top score is not positive standardizes everyone to 0.
pub fn standardize(raw_score: f64, max_raw_score: f64) -> f64 {
    if max_raw_score > 0.0 {
        raw_score / max_raw_score * 100.0
    } else {
        0.0
    }
}

/// Scores a ranked period.
///
/// The final score is the rounded standardized score plus the rank bonus,
/// rounded again. There is no floor: a weak showing can score close to 0.
pub fn score_period(period_id: &str, ranked: &[RankedEntry]) -> Vec<PeriodResult> {
    let max_raw_score = max_or_zero(ranked.iter().map(|e| e.raw_score));

    debug!(
        period_id,
        entrants = ranked.len(),
        max_raw_score,
        "Scoring period"
    );

    ranked
        .iter()
        .map(|e| {
            let standardized = round2(standardize(e.raw_score, max_raw_score));
            let bonus = rank_bonus(e.rank);

            PeriodResult {
                period_id: period_id.to_string(),
                entrant_id: e.entrant_id.clone(),
                rank: e.rank,
                raw_score: e.raw_score,
                max_raw_score,
                standardized,
                rank_bonus: bonus,
                final_score: round2(standardized + f64::from(bonus)),
            }
        })
        .collect()
}

/// Ranks and scores one period's raw entries.
pub fn compute_period(period_id: &str, entries: Vec<RawEntry>) -> Vec<PeriodResult> {
    score_period(period_id, &assign_ranks(entries))
}
