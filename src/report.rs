//! Full leaderboard computation over one score sheet snapshot.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use tracing::{info, warn};

use crate::config::LeaderboardConfig;
use crate::engine::monthly::{aggregate_month, month_is_complete};
use crate::engine::period::compute_period;
use crate::engine::season::aggregate_season;
use crate::engine::types::{MonthlyResult, PeriodResult, PeriodResults, SeasonResult};
use crate::parser::ScoreSheet;

pub const SCHEMA_VERSION: u8 = 1;

/// Every leaderboard derived from one score sheet.
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboard {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    /// When the score sheet itself last changed, as reported by its source.
    pub last_updated: Option<DateTime<Utc>>,
    pub best_n: usize,
    pub periods: PeriodResults,
    pub season: Vec<SeasonResult>,
    /// Computed months as `(label, results)`, in configuration order.
    #[serde(serialize_with = "months_as_object")]
    pub months: Vec<(String, Vec<MonthlyResult>)>,
    /// Configured months with at least one period not yet on the sheet.
    pub skipped_months: Vec<String>,
}

impl Leaderboard {
    /// Scores every period on the sheet and builds the season and month rollups.
    ///
    /// A configured month is only aggregated once all of its periods are present.
    pub fn compute(
        sheet: &ScoreSheet,
        config: &LeaderboardConfig,
        last_updated: Option<DateTime<Utc>>,
    ) -> Self {
        let mut periods = PeriodResults::new();
        for period_id in sheet.periods() {
            periods.insert(
                period_id.clone(),
                compute_period(period_id, sheet.raw_entries(period_id)),
            );
        }

        let season = aggregate_season(periods.all(), config.best_n);

        let mut months = Vec::new();
        let mut skipped_months = Vec::new();
        for (label, month_periods) in config.months() {
            if month_is_complete(month_periods, &periods) {
                months.push((
                    label.to_string(),
                    aggregate_month(month_periods, &periods, sheet),
                ));
            } else {
                warn!(month = label, "Month has periods without scores yet, skipping");
                skipped_months.push(label.to_string());
            }
        }

        info!(
            periods = periods.len(),
            entrants = season.len(),
            months = months.len(),
            skipped = skipped_months.len(),
            "Leaderboard computed"
        );

        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            last_updated,
            best_n: config.best_n,
            periods,
            season,
            months,
            skipped_months,
        }
    }

    pub fn period(&self, period_id: &str) -> Option<&[PeriodResult]> {
        self.periods.get(period_id)
    }

    pub fn latest_period(&self) -> Option<&str> {
        self.periods.latest_period()
    }

    pub fn season_entry(&self, entrant_id: &str) -> Option<&SeasonResult> {
        self.season.iter().find(|s| s.entrant_id == entrant_id)
    }

    pub fn month(&self, label: &str) -> Option<&[MonthlyResult]> {
        self.months
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, results)| results.as_slice())
    }

    /// The last computed month in configuration order.
    pub fn latest_month(&self) -> Option<&str> {
        self.months.last().map(|(label, _)| label.as_str())
    }
}

/// Months serialize as a JSON object keyed by label, keeping their order.
fn months_as_object<S: Serializer>(
    months: &[(String, Vec<MonthlyResult>)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(months.iter().map(|(label, results)| (label, results)))
}
