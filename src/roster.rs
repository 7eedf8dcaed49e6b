//! Entrant roster used for display names.
//!
//! Roster data is presentation only; scoring never reads it.

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

/// A single roster row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterEntry {
    #[serde(alias = "student_id", alias = "學號")]
    pub entrant_id: String,
    #[serde(default, alias = "student_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Lookup from entrant id to display metadata.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: HashMap<String, RosterEntry>,
}

impl Roster {
    /// Parses roster CSV text. Rows with a blank id are skipped.
    pub fn from_csv(content: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut entries = HashMap::new();
        for result in rdr.deserialize() {
            let entry: RosterEntry = result?;
            if entry.entrant_id.is_empty() {
                continue;
            }
            entries.insert(entry.entrant_id.clone(), entry);
        }

        debug!(entrants = entries.len(), "Roster parsed");
        Ok(Self { entries })
    }

    pub fn get(&self, entrant_id: &str) -> Option<&RosterEntry> {
        self.entries.get(entrant_id)
    }

    /// Display label: nickname, else name, else the id itself.
    pub fn label<'a>(&'a self, entrant_id: &'a str) -> &'a str {
        self.get(entrant_id)
            .and_then(|e| {
                non_blank(e.display_name.as_deref()).or_else(|| non_blank(e.name.as_deref()))
            })
            .unwrap_or(entrant_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
