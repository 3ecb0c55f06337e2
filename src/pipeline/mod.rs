//! Pipeline stages shared by the harvester and the fetcher.
//!
//! Each submodule implements exactly one transformation step and has no
//! network I/O of its own, so every stage is testable on in-memory input.
//!
//! ## Data Flow
//!
//! ```text
//! harvest:  HTML ──▶ search ──▶ table
//!                   (records)   (CSV)
//!
//! fetch:    table ──▶ PDF bytes ──▶ extract ──▶ clean ──▶ {id}.txt
//! ```
//!
//! 1. [`search`]  — parse a results page into records and malformed entries
//! 2. [`table`]   — read and atomically write the CSV metadata table
//! 3. [`extract`] — page-by-page PDF text extraction; runs in
//!    `spawn_blocking` because lopdf parsing is CPU-bound
//! 4. [`clean`]   — lowercase and strip punctuation

pub mod clean;
pub mod extract;
pub mod search;
pub mod table;
