//! CSV parser for the raw score sheet.
//!
//! The sheet has one row per entrant and one column per period. Period
//! columns are discovered from the header, so the layout is not fixed:
//!
//! ```text
//! student_id,ch01,ch02-1,ch02-2
//! 0554,8120,,7300
//! 0613,9050,6610,abc
//! ```
//!
//! Blank or non-numeric cells mean the entrant did not take part in that
//! period; they never reach the ranking stage.

use anyhow::{Result, bail};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::engine::types::{RawEntry, RawScoreLookup};

/// Header names accepted for the entrant id column, in priority order.
pub const ID_COLUMNS: &[&str] = &["entrant_id", "student_id", "學號"];

/// Parsed score sheet: period ids in column order plus every valid score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSheet {
    periods: Vec<String>,
    entrants: Vec<String>,
    /// `entrant_id -> period_id -> raw_score`
    scores: HashMap<String, HashMap<String, f64>>,
}

impl ScoreSheet {
    /// Period ids in header order.
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// Entrant ids in first-seen row order.
    pub fn entrants(&self) -> &[String] {
        &self.entrants
    }

    /// Clean entries for one period. Entrants without a valid score are left out.
    pub fn raw_entries(&self, period_id: &str) -> Vec<RawEntry> {
        self.entrants
            .iter()
            .filter_map(|id| {
                self.raw_score(id, period_id)
                    .map(|score| RawEntry::new(id.clone(), score))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.entrants.is_empty()
    }
}

impl RawScoreLookup for ScoreSheet {
    fn raw_score(&self, entrant_id: &str, period_id: &str) -> Option<f64> {
        self.scores.get(entrant_id)?.get(period_id).copied()
    }
}

/// Parses a score cell. Surrounding whitespace is ignored; anything that is
/// not a finite number is treated as missing.
pub fn parse_score(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        // -0 reads as 0
        .map(|v| if v == 0.0 { 0.0 } else { v })
}

/// Parses score sheet CSV text.
///
/// # Errors
///
/// Returns an error if the CSV is malformed or the header has no entrant
/// id column.
pub fn parse_score_sheet(content: &str) -> Result<ScoreSheet> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Ok(ScoreSheet::default());
    }

    let Some(id_col) = ID_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == *name))
    else {
        bail!(
            "score sheet has no entrant id column (expected one of {:?})",
            ID_COLUMNS
        );
    };

    let period_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, h)| *i != id_col && !ID_COLUMNS.contains(h) && !h.is_empty())
        .map(|(i, h)| (i, h.to_string()))
        .collect();

    let mut sheet = ScoreSheet {
        periods: period_cols.iter().map(|(_, p)| p.clone()).collect(),
        ..Default::default()
    };

    let mut dropped_rows = 0usize;

    for record in rdr.records() {
        let record = record?;
        let entrant_id = record.get(id_col).unwrap_or("").trim();
        if entrant_id.is_empty() {
            dropped_rows += 1;
            continue;
        }

        if sheet.scores.contains_key(entrant_id) {
            warn!(entrant_id, "Duplicate entrant row, merging scores");
        } else {
            sheet.entrants.push(entrant_id.to_string());
        }

        let row = sheet.scores.entry(entrant_id.to_string()).or_default();
        for (col, period_id) in &period_cols {
            if let Some(score) = record.get(*col).and_then(parse_score) {
                row.insert(period_id.clone(), score);
            }
        }
    }

    debug!(
        periods = sheet.periods.len(),
        entrants = sheet.entrants.len(),
        dropped_rows,
        "Score sheet parsed"
    );

    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_cells() {
        assert_eq!(parse_score("42"), Some(42.0));
        assert_eq!(parse_score(" 7.5 "), Some(7.5));
        assert_eq!(parse_score("0"), Some(0.0));
        assert_eq!(parse_score(""), None);
        assert_eq!(parse_score("   "), None);
        assert_eq!(parse_score("abc"), None);
        assert_eq!(parse_score("NaN"), None);
        assert_eq!(parse_score("inf"), None);
        assert!(parse_score("-0").unwrap().is_sign_positive());
        assert!(parse_score(" -0.00 ").unwrap().is_sign_positive());
    }

    #[test]
    fn test_periods_follow_header_order() {
        let sheet = parse_score_sheet("student_id,ch02,ch01,ch03-1\n0001,1,2,3\n").unwrap();
        assert_eq!(sheet.periods(), ["ch02", "ch01", "ch03-1"]);
    }

    #[test]
    fn test_leading_zeros_preserved() {
        let sheet = parse_score_sheet("student_id,ch01\n0554,10\n").unwrap();
        assert_eq!(sheet.entrants(), ["0554"]);
        assert_eq!(sheet.raw_score("0554", "ch01"), Some(10.0));
    }

    #[test]
    fn test_missing_and_invalid_cells_are_absent() {
        let csv = "student_id,ch01,ch02\n\
                   A,100,\n\
                   B,abc,50\n\
                   C,80,60\n";
        let sheet = parse_score_sheet(csv).unwrap();

        let ch01: Vec<String> = sheet.raw_entries("ch01").into_iter().map(|e| e.entrant_id).collect();
        assert_eq!(ch01, vec!["A", "C"]);

        let ch02: Vec<String> = sheet.raw_entries("ch02").into_iter().map(|e| e.entrant_id).collect();
        assert_eq!(ch02, vec!["B", "C"]);
    }

    #[test]
    fn test_rows_without_id_are_dropped() {
        let sheet = parse_score_sheet("student_id,ch01\n,100\n  ,90\nA,80\n").unwrap();
        assert_eq!(sheet.entrants(), ["A"]);
        assert_eq!(sheet.raw_entries("ch01").len(), 1);
    }

    #[test]
    fn test_chinese_id_header() {
        let sheet = parse_score_sheet("學號,ch01\n0100,5\n").unwrap();
        assert_eq!(sheet.periods(), ["ch01"]);
        assert_eq!(sheet.raw_score("0100", "ch01"), Some(5.0));
    }

    #[test]
    fn test_blank_headers_ignored() {
        let sheet = parse_score_sheet("student_id,ch01,,ch02\nA,1,x,2\n").unwrap();
        assert_eq!(sheet.periods(), ["ch01", "ch02"]);
    }

    #[test]
    fn test_duplicate_rows_merge() {
        let sheet = parse_score_sheet("student_id,ch01,ch02\nA,1,\nA,,9\n").unwrap();
        assert_eq!(sheet.entrants(), ["A"]);
        assert_eq!(sheet.raw_score("A", "ch01"), Some(1.0));
        assert_eq!(sheet.raw_score("A", "ch02"), Some(9.0));
    }

    #[test]
    fn test_short_rows_tolerated() {
        let sheet = parse_score_sheet("student_id,ch01,ch02\nA,5\n").unwrap();
        assert_eq!(sheet.raw_score("A", "ch01"), Some(5.0));
        assert_eq!(sheet.raw_score("A", "ch02"), None);
    }

    #[test]
    fn test_missing_id_column_is_error() {
        assert!(parse_score_sheet("name,ch01\nA,1\n").is_err());
    }

    #[test]
    fn test_empty_input() {
        let sheet = parse_score_sheet("").unwrap();
        assert!(sheet.is_empty());
        assert!(sheet.raw_entries("ch01").is_empty());
    }
}
