//! Data types flowing through the scoring pipeline.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// One entrant's raw score for a single period, as read from the score sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntry {
    pub entrant_id: String,
    pub raw_score: f64,
}

impl RawEntry {
    pub fn new(entrant_id: impl Into<String>, raw_score: f64) -> Self {
        Self {
            entrant_id: entrant_id.into(),
            raw_score,
        }
    }
}

/// A [`RawEntry`] with its competition rank inside the period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub entrant_id: String,
    pub raw_score: f64,
    pub rank: u32,
}

/// Scored result for one entrant in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodResult {
    pub period_id: String,
    pub entrant_id: String,
    pub rank: u32,
    pub raw_score: f64,
    pub max_raw_score: f64,
    pub standardized: f64,
    pub rank_bonus: u8,
    pub final_score: f64,
}

/// Best-N season rollup for one entrant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonResult {
    pub entrant_id: String,
    /// Every period result the entrant has, not only the counted ones.
    pub periods: Vec<PeriodResult>,
    pub best_n: usize,
    pub total_final: f64,
    pub percent_100: f64,
    pub rank: u32,
}

/// An entrant's final score for one period of a month group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodFinal {
    pub period_id: String,
    pub final_score: f64,
}

/// Fixed-window month rollup for one entrant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyResult {
    pub entrant_id: String,
    pub period_scores: Vec<PeriodFinal>,
    pub month_total: f64,
    /// Tie-break only.
    #[serde(skip_serializing)]
    pub raw_total: f64,
    pub rank: u32,
}

/// Scored periods keyed by period id, iterated in insertion order.
///
/// Period ids come from the score sheet header, so the set of keys is only
/// known at runtime. Insertion order follows the sheet's column order, which
/// makes the last inserted period the most recent one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodResults {
    order: Vec<String>,
    by_period: HashMap<String, Vec<PeriodResult>>,
}

impl PeriodResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the results for `period_id`, replacing any earlier results for it.
    pub fn insert(&mut self, period_id: impl Into<String>, results: Vec<PeriodResult>) {
        let period_id = period_id.into();
        if !self.by_period.contains_key(&period_id) {
            self.order.push(period_id.clone());
        }
        self.by_period.insert(period_id, results);
    }

    pub fn get(&self, period_id: &str) -> Option<&[PeriodResult]> {
        self.by_period.get(period_id).map(Vec::as_slice)
    }

    pub fn contains(&self, period_id: &str) -> bool {
        self.by_period.contains_key(period_id)
    }

    pub fn period_ids(&self) -> &[String] {
        &self.order
    }

    pub fn latest_period(&self) -> Option<&str> {
        self.order.last().map(String::as_str)
    }

    /// Iterates over `(period_id, results)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PeriodResult])> {
        self.order
            .iter()
            .filter_map(|id| self.get(id).map(|results| (id.as_str(), results)))
    }

    /// Every stored result across all periods.
    pub fn all(&self) -> impl Iterator<Item = &PeriodResult> {
        self.iter().flat_map(|(_, results)| results.iter())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Serializes as a JSON object whose keys keep period order.
impl Serialize for PeriodResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (period_id, results) in self.iter() {
            map.serialize_entry(period_id, results)?;
        }
        map.end()
    }
}

/// Looks up an entrant's raw score for a period.
pub trait RawScoreLookup {
    fn raw_score(&self, entrant_id: &str, period_id: &str) -> Option<f64>;
}

/// `entrant_id -> period_id -> raw_score`
impl RawScoreLookup for HashMap<String, HashMap<String, f64>> {
    fn raw_score(&self, entrant_id: &str, period_id: &str) -> Option<f64> {
        self.get(entrant_id)?.get(period_id).copied()
    }
}

/// Raw scores are carried on every [`PeriodResult`], so scored periods can
/// serve as their own lookup.
impl RawScoreLookup for PeriodResults {
    fn raw_score(&self, entrant_id: &str, period_id: &str) -> Option<f64> {
        self.get(period_id)?
            .iter()
            .find(|r| r.entrant_id == entrant_id)
            .map(|r| r.raw_score)
    }
}
