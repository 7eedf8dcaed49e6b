//! Month rollup: sum of final scores over a fixed list of periods.

use crate::engine::rank::descending;
use crate::engine::types::{MonthlyResult, PeriodFinal, PeriodResults, RawScoreLookup};
use crate::engine::utility::round2;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Returns `true` when every period of the month has been scored.
///
/// [`aggregate_month`] does not check this itself; callers skip months
/// that are not complete yet.
pub fn month_is_complete(month_periods: &[String], scored: &PeriodResults) -> bool {
    month_periods.iter().all(|p| scored.contains(p))
}

/// Builds a month leaderboard over `month_periods`.
///
/// Periods an entrant missed contribute nothing, and a period listed more
/// than once is counted once. Entrants are ordered by
/// month total, then raw total (both descending), then id ascending, and
/// ranked by position: ties get distinct consecutive ranks, unlike the
/// period and season leaderboards.
pub fn aggregate_month(
    month_periods: &[String],
    scored: &PeriodResults,
    raw_scores: &impl RawScoreLookup,
) -> Vec<MonthlyResult> {
    // Entrants in first-seen order; the final sort makes order deterministic anyway.
    let mut entrants: Vec<MonthlyResult> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counted: HashSet<&str> = HashSet::new();

    for period_id in month_periods {
        if !counted.insert(period_id.as_str()) {
            continue;
        }
        let Some(results) = scored.get(period_id) else {
            continue;
        };

        for r in results {
            let slot = *index.entry(r.entrant_id.clone()).or_insert_with(|| {
                entrants.push(MonthlyResult {
                    entrant_id: r.entrant_id.clone(),
                    period_scores: Vec::new(),
                    month_total: 0.0,
                    raw_total: 0.0,
                    rank: 0,
                });
                entrants.len() - 1
            });

            let entry = &mut entrants[slot];
            entry.period_scores.push(PeriodFinal {
                period_id: period_id.clone(),
                final_score: r.final_score,
            });
            entry.raw_total += raw_scores
                .raw_score(&r.entrant_id, period_id)
                .unwrap_or(0.0);
        }
    }

    for entry in &mut entrants {
        entry.month_total = round2(entry.period_scores.iter().map(|p| p.final_score).sum());
    }

    entrants.sort_by(|a, b| {
        descending(a.month_total, b.month_total)
            .then_with(|| descending(a.raw_total, b.raw_total))
            .then_with(|| a.entrant_id.cmp(&b.entrant_id))
    });

    for (i, entry) in entrants.iter_mut().enumerate() {
        entry.rank = (i + 1) as u32;
    }

    debug!(
        periods = counted.len(),
        entrants = entrants.len(),
        "Month aggregated"
    );

    entrants
}
