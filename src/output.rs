//! Records and run reports produced by the harvester and the fetcher.

use crate::error::{DecisionError, EntryError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One scraped search result; one row of the metadata table.
///
/// Field order is the column order of the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    /// File stem of `location`, e.g. `DRN-1234567`.
    pub decision_id: String,
    /// Link target of the result, relative to the site root.
    pub location: String,
    pub title: String,
    /// Decision date as shown on the page; not parsed.
    pub date: String,
    pub company: String,
    /// Outcome label, e.g. `Upheld`.
    pub decision: String,
    /// Remaining info lines joined with `,`.
    pub extras: String,
    pub tag: String,
}

/// Derive a decision id from a location: the file name without extension.
///
/// Returns `None` when the location has no file name component.
pub fn decision_id_from_location(location: &str) -> Option<String> {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}

/// One parsed search results page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    /// Pagination offset the page was requested with.
    pub start: usize,
    pub records: Vec<MetadataRecord>,
    /// Entries that were present but could not be parsed.
    pub malformed: Vec<EntryError>,
}

impl SearchPage {
    /// Number of result items on the page, malformed ones included.
    pub fn len(&self) -> usize {
        self.records.len() + self.malformed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counters for a harvest run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestStats {
    /// Search requests issued, the terminating empty page included.
    pub requests: usize,
    /// Pages that contained at least one entry.
    pub pages_scraped: usize,
    pub records: usize,
    /// Entries skipped as malformed.
    pub malformed: usize,
}

/// Everything a harvest run collected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarvestOutput {
    pub records: Vec<MetadataRecord>,
    pub malformed: Vec<EntryError>,
    pub stats: HarvestStats,
}

/// Result of processing one table row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RowOutcome {
    /// Text file written; `chars` is the length of the cleaned text.
    Converted { chars: usize },
    /// Text file already existed.
    Skipped,
    Failed(DecisionError),
}

/// A row that failed, for the end-of-run report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowFailure {
    pub decision_id: String,
    pub error: DecisionError,
}

/// Counters for a fetch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchStats {
    pub total_rows: usize,
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Aggregate result of a fetch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchReport {
    pub stats: FetchStats,
    pub failures: Vec<RowFailure>,
}

impl FetchReport {
    pub(crate) fn record(&mut self, decision_id: &str, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Converted { .. } => self.stats.converted += 1,
            RowOutcome::Skipped => self.stats.skipped += 1,
            RowOutcome::Failed(error) => {
                self.stats.failed += 1;
                self.failures.push(RowFailure {
                    decision_id: decision_id.to_string(),
                    error: error.clone(),
                });
            }
        }
    }

    /// True when no row failed.
    pub fn is_success(&self) -> bool {
        self.stats.failed == 0
    }
}
