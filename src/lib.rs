//! # ombudsman-decisions
//!
//! Scrape published ombudsman decision metadata and turn the decision PDFs
//! into cleaned plain text for downstream text analysis.
//!
//! ## Pipeline Overview
//!
//! Two independent stages; the CSV table is the only thing they share.
//!
//! ```text
//! harvest                                  fetch
//! ───────                                  ─────
//! SearchQuery                              decisions.csv
//!  │                                        │
//!  ├─ 1. Query    encode filters + offset   ├─ 1. Skip    {id}.txt exists
//!  ├─ 2. Page     GET results page          ├─ 2. Delay   fixed politeness pause
//!  ├─ 3. Parse    entries → records         ├─ 3. GET     PDF → temp file
//!  ├─ 4. Repeat   until empty/short page    ├─ 4. Extract page-by-page text (lopdf)
//!  └─ 5. Write    decisions.csv             ├─ 5. Clean   lowercase, strip punctuation
//!                                           └─ 6. Write   {id}.txt, delete temp PDF
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ombudsman_decisions::{
//!     download_and_convert, harvest_to_file, FetchConfig, HarvestConfig, HttpClientConfig,
//!     IndustrySector, ReqwestFetcher, SearchQuery,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ReqwestFetcher::new(&HttpClientConfig::default())?;
//!
//!     let query = SearchQuery::builder()
//!         .sector(IndustrySector::Insurance)
//!         .build()?;
//!     let stats = harvest_to_file(&client, &query, &HarvestConfig::default(), "decisions.csv").await?;
//!     eprintln!("{} decisions found", stats.records);
//!
//!     let report =
//!         download_and_convert(&client, "decisions.csv", "decisions_txt", &FetchConfig::default())
//!             .await?;
//!     eprintln!("{} converted, {} failed", report.stats.converted, report.stats.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ombudsman` binary (clap + anyhow + serde_json + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod fetch;
pub mod harvest;
pub mod http;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod query;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    FetchConfig, FetchConfigBuilder, HarvestConfig, HarvestConfigBuilder, HttpClientConfig,
    DEFAULT_DECISIONS_BASE_URL, DEFAULT_METADATA_FILE, DEFAULT_OUTPUT_DIR, DEFAULT_SEARCH_URL,
};
pub use error::{DecisionError, EntryError, ScrapeError};
pub use fetch::{convert_row, download_and_convert};
pub use harvest::{harvest, harvest_to_file, search_pages, PageStream};
pub use http::{HttpFetch, ReqwestFetcher};
pub use output::{
    FetchReport, FetchStats, HarvestOutput, HarvestStats, MetadataRecord, RowFailure, RowOutcome,
    SearchPage,
};
pub use pipeline::clean::clean_text;
pub use progress::{
    FetchProgress, FetchProgressCallback, HarvestProgress, HarvestProgressCallback,
};
pub use query::{IndustrySector, SearchQuery, SearchQueryBuilder, UpheldFilter};
