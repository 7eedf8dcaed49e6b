//! Season rollup: best-N period total per entrant, normalized onto 60..=100.

use crate::engine::rank::{by_score_then_id, competition_ranks, descending};
use crate::engine::types::{PeriodResult, SeasonResult};
use crate::engine::utility::round2;
use std::collections::HashMap;
use tracing::debug;

/// Percentage given to the lowest season total.
pub const PERCENT_FLOOR: f64 = 60.0;
/// Width of the percentage band above the floor.
pub const PERCENT_SPAN: f64 = 40.0;

/// Maps `total` onto `[60, 100]` relative to the observed `lo..=hi` range.
///
/// When every total is equal there is no range to normalize against and
/// everyone gets the floor.
pub fn percent_100(total: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        round2(PERCENT_FLOOR + (total - lo) / (hi - lo) * PERCENT_SPAN)
    } else {
        PERCENT_FLOOR
    }
}

/// Sums an entrant's `best_n` highest final scores, rounded to 2dp.
/// Entrants with fewer periods are summed over what they have.
pub fn best_n_total(results: &[PeriodResult], best_n: usize) -> f64 {
    let mut finals: Vec<f64> = results.iter().map(|r| r.final_score).collect();
    finals.sort_by(|a, b| descending(*a, *b));

    round2(finals.iter().take(best_n).sum())
}

/// Builds the season leaderboard from every scored period.
///
/// Entrants are ordered by total descending, then id ascending, and ranked
/// with standard competition ranking on the total.
pub fn aggregate_season<'a>(
    results: impl IntoIterator<Item = &'a PeriodResult>,
    best_n: usize,
) -> Vec<SeasonResult> {
    let mut by_entrant: HashMap<&str, Vec<PeriodResult>> = HashMap::new();
    for r in results {
        by_entrant
            .entry(r.entrant_id.as_str())
            .or_default()
            .push(r.clone());
    }

    let mut season: Vec<SeasonResult> = by_entrant
        .into_iter()
        .map(|(entrant_id, periods)| SeasonResult {
            entrant_id: entrant_id.to_string(),
            best_n,
            total_final: best_n_total(&periods, best_n),
            periods,
            percent_100: PERCENT_FLOOR,
            rank: 0,
        })
        .collect();

    season.sort_by(|a, b| by_score_then_id(a.total_final, &a.entrant_id, b.total_final, &b.entrant_id));

    let hi = season.first().map_or(0.0, |s| s.total_final);
    let lo = season.last().map_or(0.0, |s| s.total_final);
    let ranks = competition_ranks(&season, |s| s.total_final);

    for (entry, rank) in season.iter_mut().zip(ranks) {
        entry.percent_100 = percent_100(entry.total_final, lo, hi);
        entry.rank = rank;
    }

    debug!(entrants = season.len(), best_n, lo, hi, "Season aggregated");

    season
}
