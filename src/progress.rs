//! Progress-callback traits for harvest and fetch events.
//!
//! Inject an `Arc<dyn HarvestProgressCallback>` via
//! [`crate::config::HarvestConfigBuilder::progress`] or an
//! `Arc<dyn FetchProgressCallback>` via
//! [`crate::config::FetchConfigBuilder::progress`] to receive events as the
//! pipeline runs. The library itself only logs; drawing progress bars is the
//! caller's business.
//!
//! # Example
//!
//! ```rust
//! use ombudsman_decisions::{FetchConfig, FetchProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct Counter(AtomicUsize);
//!
//! impl FetchProgressCallback for Counter {
//!     fn on_row_complete(&self, _decision_id: &str, _chars: usize) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let config = FetchConfig::builder()
//!     .progress(Arc::new(Counter(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use crate::error::EntryError;
use crate::output::FetchStats;
use std::sync::Arc;

/// Called by the harvester as it walks the search result pages.
///
/// All methods have default no-op implementations.
pub trait HarvestProgressCallback: Send + Sync {
    /// A search page was fetched and parsed.
    ///
    /// # Arguments
    /// * `start`   — pagination offset of the page
    /// * `entries` — number of result items on the page, malformed included
    fn on_page(&self, start: usize, entries: usize) {
        let _ = (start, entries);
    }

    /// A result item was skipped because it is malformed.
    fn on_entry_skipped(&self, start: usize, error: &EntryError) {
        let _ = (start, error);
    }

    /// The last page was reached.
    fn on_harvest_complete(&self, records: usize) {
        let _ = records;
    }
}

/// Called by the fetcher for every row of the metadata table.
///
/// All methods have default no-op implementations.
pub trait FetchProgressCallback: Send + Sync {
    /// Called once after the table has been read.
    fn on_fetch_start(&self, total_rows: usize) {
        let _ = total_rows;
    }

    /// The row's text file already exists.
    fn on_row_skipped(&self, decision_id: &str) {
        let _ = decision_id;
    }

    /// Called just before the politeness delay and the download.
    fn on_row_start(&self, decision_id: &str) {
        let _ = decision_id;
    }

    /// The text file was written.
    ///
    /// # Arguments
    /// * `chars` — character count of the cleaned text
    fn on_row_complete(&self, decision_id: &str, chars: usize) {
        let _ = (decision_id, chars);
    }

    /// The row failed; `error` is the rendered [`crate::error::DecisionError`].
    fn on_row_error(&self, decision_id: &str, error: &str) {
        let _ = (decision_id, error);
    }

    /// Called once after the last row.
    fn on_fetch_complete(&self, stats: &FetchStats) {
        let _ = stats;
    }
}

/// Shared harvest callback handle stored in [`crate::config::HarvestConfig`].
pub type HarvestProgress = Arc<dyn HarvestProgressCallback>;

/// Shared fetch callback handle stored in [`crate::config::FetchConfig`].
pub type FetchProgress = Arc<dyn FetchProgressCallback>;
