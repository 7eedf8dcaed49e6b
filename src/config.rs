use anyhow::{Context, Result, bail};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Default number of best periods counted towards the season total.
pub const DEFAULT_BEST_N: usize = 10;

/// Leaderboard settings.
///
/// Stored as a JSON object on disk, every field optional:
/// ```json
/// {
///   "best_n": 10,
///   "months": {
///     "2024-10": ["ch01", "ch02", "ch03", "ch04"],
///     "2024-11": ["ch05", "ch06", "ch07", "ch08"]
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeaderboardConfig {
    pub best_n: usize,
    /// Month label -> ordered period ids, in the order they were configured.
    pub months: MonthGroups,
}

/// Month groups keyed by label, kept in configuration order.
///
/// The last group is the most recent month, whatever its label sorts as.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthGroups(Vec<(String, Vec<String>)>);

impl MonthGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the periods for `label`, keeping its position if it already exists.
    pub fn insert(&mut self, label: impl Into<String>, periods: Vec<String>) {
        let label = label.into();
        match self.0.iter_mut().find(|(l, _)| *l == label) {
            Some((_, existing)) => *existing = periods,
            None => self.0.push((label, periods)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, periods)| periods.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(l, p)| (l.as_str(), p.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, Vec<String>)> for MonthGroups {
    fn from_iter<I: IntoIterator<Item = (L, Vec<String>)>>(iter: I) -> Self {
        let mut groups = Self::new();
        for (label, periods) in iter {
            groups.insert(label, periods);
        }
        groups
    }
}

/// Reads a JSON object entry by entry so document order survives.
impl<'de> Deserialize<'de> for MonthGroups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = MonthGroups;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping month labels to period id lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut groups = MonthGroups::new();
                while let Some((label, periods)) = access.next_entry::<String, Vec<String>>()? {
                    groups.insert(label, periods);
                }
                Ok(groups)
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            best_n: DEFAULT_BEST_N,
            months: MonthGroups::new(),
        }
    }
}

impl LeaderboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {path}"))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse config in {path}"))
    }

    /// Loads the optional config file, then applies environment overrides.
    ///
    /// `BEST_N` replaces `best_n`; `MONTH_PERIODS` holds the month map as a
    /// JSON object. A malformed `MONTH_PERIODS` is ignored with a warning.
    pub fn resolve(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        config.apply_overrides(
            std::env::var("BEST_N").ok().as_deref(),
            std::env::var("MONTH_PERIODS").ok().as_deref(),
        )?;
        config.validate()?;

        debug!(best_n = config.best_n, months = config.months.len(), "Config resolved");
        Ok(config)
    }

    fn apply_overrides(&mut self, best_n: Option<&str>, months: Option<&str>) -> Result<()> {
        if let Some(raw) = best_n {
            self.best_n = raw
                .trim()
                .parse()
                .with_context(|| format!("BEST_N must be a positive integer, got {raw:?}"))?;
        }

        if let Some(raw) = months {
            match serde_json::from_str::<MonthGroups>(raw) {
                Ok(parsed) => self.months = parsed,
                Err(e) => warn!(error = %e, "Could not parse MONTH_PERIODS, keeping configured months"),
            }
        }

        Ok(())
    }

    /// Checks that `best_n` is positive and every month names at least one
    /// period, none of them twice.
    pub fn validate(&self) -> Result<()> {
        if self.best_n == 0 {
            bail!("best_n must be a positive integer");
        }
        for (label, periods) in self.months() {
            if periods.is_empty() {
                bail!("month {label:?} has no periods");
            }
            let mut seen = HashSet::new();
            if let Some(dup) = periods.iter().find(|p| !seen.insert(p.as_str())) {
                bail!("month {label:?} lists period {dup:?} more than once");
            }
        }
        Ok(())
    }

    /// Iterates over `(label, period_ids)` pairs in configuration order.
    pub fn months(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.months.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = LeaderboardConfig::default();
        assert_eq!(config.best_n, 10);
        assert!(config.months.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"months": {{"Oct": ["ch01", "ch02"]}}}}"#).unwrap();

        let config = LeaderboardConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.best_n, 10);
        assert_eq!(config.months.get("Oct"), Some(&["ch01".to_string(), "ch02".to_string()][..]));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bestN": 3}}"#).unwrap();

        assert!(LeaderboardConfig::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = LeaderboardConfig::default();
        config
            .apply_overrides(Some(" 8 "), Some(r#"{"Nov": ["ch05"]}"#))
            .unwrap();

        assert_eq!(config.best_n, 8);
        assert_eq!(config.months.len(), 1);
        assert_eq!(config.months().next(), Some(("Nov", &["ch05".to_string()][..])));
    }

    #[test]
    fn test_bad_month_override_keeps_existing() {
        let mut config = LeaderboardConfig::default();
        config.months.insert("Oct", vec!["ch01".into()]);
        config.apply_overrides(None, Some("not json")).unwrap();

        assert!(config.months.get("Oct").is_some());
    }

    #[test]
    fn test_bad_best_n_override_is_error() {
        let mut config = LeaderboardConfig::default();
        assert!(config.apply_overrides(Some("ten"), None).is_err());
        assert!(config.apply_overrides(Some("-1"), None).is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = LeaderboardConfig::default();
        config.best_n = 0;
        assert!(config.validate().is_err());

        let mut config = LeaderboardConfig::default();
        config.months.insert("Oct", Vec::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_repeated_period() {
        let mut config = LeaderboardConfig::default();
        config.months.insert("Oct", vec!["w1".into(), "w2".into(), "w1".into()]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("\"w1\""));

        // The same period in two different months is allowed.
        let mut config = LeaderboardConfig::default();
        config.months.insert("Oct", vec!["w1".into()]);
        config.months.insert("Nov", vec!["w1".into()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_months_keep_configured_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"months": {{"9月": ["w1"], "10月": ["w2"], "Oct": ["w3"], "Nov": ["w4"]}}}}"#
        )
        .unwrap();

        let config = LeaderboardConfig::load(file.path().to_str().unwrap()).unwrap();
        let labels: Vec<&str> = config.months().map(|(label, _)| label).collect();
        assert_eq!(labels, ["9月", "10月", "Oct", "Nov"]);
    }

    #[test]
    fn test_month_override_keeps_order() {
        let mut config = LeaderboardConfig::default();
        config
            .apply_overrides(None, Some(r#"{"Nov": ["w5"], "Dec": ["w6"], "Jan": ["w7"]}"#))
            .unwrap();

        let labels: Vec<&str> = config.months().map(|(label, _)| label).collect();
        assert_eq!(labels, ["Nov", "Dec", "Jan"]);
    }

    #[test]
    fn test_month_groups_insert_replaces_in_place() {
        let mut groups = MonthGroups::new();
        groups.insert("Oct", vec!["w1".into()]);
        groups.insert("Nov", vec!["w2".into()]);
        groups.insert("Oct", vec!["w3".into()]);

        assert_eq!(groups.len(), 2);
        let labels: Vec<&str> = groups.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, ["Oct", "Nov"]);
        assert_eq!(groups.get("Oct"), Some(&["w3".to_string()][..]));
    }
}
