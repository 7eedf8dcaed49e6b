//! Output formatting and persistence for leaderboards.
//!
//! Supports plain-text tables, JSON serialization, and CSV export.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

use crate::engine::types::{MonthlyResult, PeriodResult, SeasonResult};
use crate::roster::Roster;

/// Which score columns a table shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum View {
    /// Raw scores as entered.
    Raw,
    /// Standardized scores, bonuses and final scores.
    #[default]
    Final,
}

/// Serializes any value as pretty-printed JSON.
pub fn to_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes `records` to a CSV file at `path`, one row per record, replacing
/// any existing file.
pub fn write_records<T: Serialize>(path: impl AsRef<Path>, records: &[T]) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), rows = records.len(), "Writing CSV");

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Flat season row for CSV export.
#[derive(Debug, Serialize)]
pub struct SeasonRow<'a> {
    pub rank: u32,
    pub entrant_id: &'a str,
    pub name: &'a str,
    pub periods_played: usize,
    pub best_n: usize,
    pub total_final: f64,
    pub percent_100: f64,
}

pub fn season_rows<'a>(season: &'a [SeasonResult], roster: &'a Roster) -> Vec<SeasonRow<'a>> {
    season
        .iter()
        .map(|s| SeasonRow {
            rank: s.rank,
            entrant_id: &s.entrant_id,
            name: roster.label(&s.entrant_id),
            periods_played: s.periods.len(),
            best_n: s.best_n,
            total_final: s.total_final,
            percent_100: s.percent_100,
        })
        .collect()
}

/// Writes a month leaderboard with one column per month period.
/// Periods an entrant missed are left blank.
pub fn write_month_csv(
    path: impl AsRef<Path>,
    month_periods: &[String],
    month: &[MonthlyResult],
    roster: &Roster,
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path.as_ref())?;

    let mut header = vec!["rank", "entrant_id", "name"];
    header.extend(month_periods.iter().map(String::as_str));
    header.push("month_total");
    writer.write_record(&header)?;

    for row in month {
        let mut record = vec![
            row.rank.to_string(),
            row.entrant_id.clone(),
            roster.label(&row.entrant_id).to_string(),
        ];
        for period_id in month_periods {
            record.push(
                period_final(row, period_id)
                    .map(|f| format!("{f:.2}"))
                    .unwrap_or_default(),
            );
        }
        record.push(format!("{:.2}", row.month_total));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}

fn period_final(row: &MonthlyResult, period_id: &str) -> Option<f64> {
    row.period_scores
        .iter()
        .find(|p| p.period_id == period_id)
        .map(|p| p.final_score)
}

/// Renders one period's leaderboard.
pub fn period_table(results: &[PeriodResult], roster: &Roster, view: View) -> String {
    let mut out = String::new();

    match view {
        View::Raw => {
            out.push_str(&format!("{:>4}  {:<10} {:<16} {:>10}\n", "rank", "id", "name", "raw"));
            for r in results {
                out.push_str(&format!(
                    "{:>4}  {:<10} {:<16} {:>10}\n",
                    r.rank,
                    r.entrant_id,
                    roster.label(&r.entrant_id),
                    r.raw_score
                ));
            }
        }
        View::Final => {
            out.push_str(&format!(
                "{:>4}  {:<10} {:<16} {:>10} {:>8} {:>6} {:>8}\n",
                "rank", "id", "name", "raw", "std", "bonus", "final"
            ));
            for r in results {
                out.push_str(&format!(
                    "{:>4}  {:<10} {:<16} {:>10} {:>8.2} {:>6} {:>8.2}\n",
                    r.rank,
                    r.entrant_id,
                    roster.label(&r.entrant_id),
                    r.raw_score,
                    r.standardized,
                    format!("+{}", r.rank_bonus),
                    r.final_score
                ));
            }
        }
    }

    out
}

/// Renders the season leaderboard.
///
/// The raw view shows periods played and average raw score; the final view
/// shows the best-N total and its percentage.
pub fn season_table(season: &[SeasonResult], roster: &Roster, view: View) -> String {
    let mut out = String::new();

    match view {
        View::Raw => {
            out.push_str(&format!("{:>4}  {:<10} {:<16} {:>7} {:>10}\n", "rank", "id", "name", "played", "avg raw"));
            for s in season {
                out.push_str(&format!(
                    "{:>4}  {:<10} {:<16} {:>7} {:>10.2}\n",
                    s.rank,
                    s.entrant_id,
                    roster.label(&s.entrant_id),
                    s.periods.len(),
                    average_raw_score(s)
                ));
            }
        }
        View::Final => {
            out.push_str(&format!(
                "{:>4}  {:<10} {:<16} {:>6} {:>10} {:>8}\n",
                "rank", "id", "name", "best", "total", "pct"
            ));
            for s in season {
                out.push_str(&format!(
                    "{:>4}  {:<10} {:<16} {:>6} {:>10.2} {:>8.2}\n",
                    s.rank,
                    s.entrant_id,
                    roster.label(&s.entrant_id),
                    s.best_n.min(s.periods.len()),
                    s.total_final,
                    s.percent_100
                ));
            }
        }
    }

    out
}

/// Renders a month leaderboard; per-period scores are shown as `a + b + c`.
pub fn month_table(label: &str, month: &[MonthlyResult], roster: &Roster) -> String {
    let mut out = String::new();
    out.push_str(&format!("{label}\n"));
    out.push_str(&format!("{:>4}  {:<10} {:<16} {:>8}  {}\n", "rank", "id", "name", "total", "periods"));

    for row in month {
        let breakdown = row
            .period_scores
            .iter()
            .map(|p| format!("{:.2}", p.final_score))
            .collect::<Vec<_>>()
            .join(" + ");
        out.push_str(&format!(
            "{:>4}  {:<10} {:<16} {:>8.2}  {}\n",
            row.rank,
            row.entrant_id,
            roster.label(&row.entrant_id),
            row.month_total,
            breakdown
        ));
    }

    out
}

fn average_raw_score(season: &SeasonResult) -> f64 {
    if season.periods.is_empty() {
        return 0.0;
    }
    season.periods.iter().map(|p| p.raw_score).sum::<f64>() / season.periods.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::period::compute_period;
    use crate::engine::season::aggregate_season;
    use crate::engine::types::{PeriodFinal, RawEntry};
    use std::fs;

    fn sample_period() -> Vec<PeriodResult> {
        compute_period(
            "ch01",
            vec![
                RawEntry::new("0554", 90.0),
                RawEntry::new("0613", 90.0),
                RawEntry::new("0700", 45.0),
            ],
        )
    }

    fn sample_month() -> Vec<MonthlyResult> {
        vec![MonthlyResult {
            entrant_id: "0554".into(),
            period_scores: vec![
                PeriodFinal {
                    period_id: "ch01".into(),
                    final_score: 79.05,
                },
                PeriodFinal {
                    period_id: "ch03".into(),
                    final_score: 105.0,
                },
            ],
            month_total: 184.05,
            raw_total: 1200.0,
            rank: 1,
        }]
    }

    #[test]
    fn test_period_table_final_view() {
        let roster = Roster::from_csv("student_id,display_name\n0554,Wei\n").unwrap();
        let table = period_table(&sample_period(), &roster, View::Final);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("Wei"));
        assert!(lines[1].contains("105.00"));
        assert!(lines[3].contains("+2"));
    }

    #[test]
    fn test_period_table_raw_view_has_no_final_column() {
        let table = period_table(&sample_period(), &Roster::default(), View::Raw);
        assert!(!table.contains("final"));
        assert!(table.contains("45"));
    }

    #[test]
    fn test_season_table_views() {
        let period = sample_period();
        let season = aggregate_season(&period, 10);

        let final_view = season_table(&season, &Roster::default(), View::Final);
        assert!(final_view.contains("100.00"));
        assert!(final_view.contains("60.00"));

        let raw_view = season_table(&season, &Roster::default(), View::Raw);
        assert!(raw_view.contains("avg raw"));
        assert!(raw_view.contains("90.00"));
    }

    #[test]
    fn test_month_table_breakdown() {
        let table = month_table("Oct", &sample_month(), &Roster::default());
        assert!(table.starts_with("Oct\n"));
        assert!(table.contains("79.05 + 105.00"));
        assert!(table.contains("184.05"));
    }

    #[test]
    fn test_every_table_row_is_newline_terminated() {
        let period = sample_period();
        let season = aggregate_season(&period, 10);
        let roster = Roster::default();

        let tables = [
            (period_table(&period, &roster, View::Raw), 4),
            (period_table(&period, &roster, View::Final), 4),
            (season_table(&season, &roster, View::Raw), 4),
            (season_table(&season, &roster, View::Final), 4),
            (month_table("Oct", &sample_month(), &roster), 3),
        ];
        for (table, rows) in tables {
            assert!(table.ends_with('\n'));
            assert_eq!(table.matches('\n').count(), rows);
        }
    }

    #[test]
    fn test_json_hides_raw_total() {
        let json = to_json(&sample_month()).unwrap();
        assert!(json.contains("month_total"));
        assert!(!json.contains("raw_total"));
    }

    #[test]
    fn test_write_records_period_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ch01.csv");

        write_records(&path, &sample_period()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("period_id,entrant_id,rank"));
    }

    #[test]
    fn test_write_records_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("season.csv");
        let period = sample_period();
        let season = aggregate_season(&period, 10);
        let roster = Roster::default();

        write_records(&path, &season_rows(&season, &roster)).unwrap();
        write_records(&path, &season_rows(&season, &roster)).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("rank,")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 4);
    }

    #[test]
    fn test_write_month_csv_blank_for_missing_period() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oct.csv");
        let periods: Vec<String> = vec!["ch01".into(), "ch02".into(), "ch03".into()];

        write_month_csv(&path, &periods, &sample_month(), &Roster::default()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "rank,entrant_id,name,ch01,ch02,ch03,month_total");
        assert_eq!(lines[1], "1,0554,0554,79.05,,105.00,184.05");
    }
}
