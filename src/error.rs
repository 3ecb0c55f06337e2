//! Error types for the ombudsman-decisions library.
//!
//! Three error types reflect three distinct failure scopes:
//!
//! * [`ScrapeError`] — **Fatal**: the run cannot proceed (network failure on a
//!   search page, the results layout changed, the table cannot be read or
//!   written). Returned as `Err(ScrapeError)` from the top-level functions.
//!
//! * [`DecisionError`] — **Per row**: a single decision could not be
//!   downloaded or converted. Stored in the fetch report so the batch keeps
//!   going; only escalated to [`ScrapeError::RowFailed`] in fail-fast mode.
//!
//! * [`EntryError`] — **Per search entry**: one result item on a search page
//!   is missing an expected element. The entry is skipped and counted.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the library.
#[derive(Debug, Error)]
pub enum ScrapeError {
    // ── Network errors ────────────────────────────────────────────────────
    /// Connection, TLS or body-read failure.
    #[error("Request to '{url}' failed: {reason}\nCheck your internet connection.")]
    Network { url: String, reason: String },

    /// The server answered with a non-success status.
    #[error("Request to '{url}' returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// A base URL or decision location could not be turned into a URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // ── Parsing errors ────────────────────────────────────────────────────
    /// A structural element of the search results page is missing.
    #[error("Malformed search results page (start={start}): {detail}")]
    MalformedHtml { start: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create a directory or read/write a file.
    #[error("File system error on '{path}': {source}")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The metadata table could not be encoded or decoded.
    #[error("Metadata table error in '{path}': {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An industry sector name is not in the known sector table.
    #[error("Unknown industry sector '{0}'\nKnown sectors: banking-credit-mortgages, investment-pensions, insurance, payment-protection-insurance, claims-management-ombudsman-decisions, funeral-plans")]
    UnknownSector(String),

    // ── Batch errors ──────────────────────────────────────────────────────
    /// A decision failed while running in fail-fast mode.
    #[error("Decision '{decision_id}' failed: {source}")]
    RowFailed {
        decision_id: String,
        #[source]
        source: DecisionError,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single decision row.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum DecisionError {
    /// The table row cannot be processed at all.
    #[error("invalid row: {detail}")]
    InvalidRow { detail: String },

    /// The PDF download failed.
    #[error("download failed: {detail}")]
    Download { detail: String },

    /// The downloaded body does not start with the PDF magic bytes.
    #[error("response is not a PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    /// The PDF could not be parsed or has no readable pages.
    #[error("malformed PDF: {detail}")]
    MalformedPdf { detail: String },

    /// The temporary PDF or the text file could not be written.
    #[error("write failed for '{path}': {detail}")]
    WriteFailed { path: PathBuf, detail: String },
}

/// A malformed entry on a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum EntryError {
    /// An expected sub-element (anchor, heading, info block, tag) is absent.
    #[error("entry {index}: missing {element}")]
    MissingElement { index: usize, element: String },

    /// The info block has fewer than the three positional lines.
    #[error("entry {index}: expected date, company and decision lines, found {found} line(s)")]
    TooFewMetadataLines { index: usize, found: usize },

    /// The link target has no file name to derive a decision id from.
    #[error("entry {index}: no decision id in location '{location}'")]
    NoDecisionId { index: usize, location: String },
}
