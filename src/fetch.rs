//! Decision download and conversion.
//!
//! Reads the metadata table and makes sure every row ends up with a
//! `{decision_id}.txt` in the output directory. The existence of that file is
//! the only resumability marker: rows that have one are skipped without a
//! request or a delay, so re-running a finished batch is a no-op.
//!
//! Each row is processed in isolation. A failed download or an unreadable
//! PDF is recorded in the [`FetchReport`] and the batch moves on, unless
//! [`FetchConfig::fail_fast`] is set.

use crate::config::FetchConfig;
use crate::error::{DecisionError, ScrapeError};
use crate::http::HttpFetch;
use crate::output::{FetchReport, MetadataRecord, RowOutcome};
use crate::pipeline::{clean, extract, table};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Path of the text file for `decision_id` inside `output_dir`.
pub fn text_path(output_dir: &Path, decision_id: &str) -> PathBuf {
    output_dir.join(format!("{decision_id}.txt"))
}

/// Download and convert every row of `metadata_file` into `output_dir`.
///
/// # Returns
/// `Ok(FetchReport)` once every row was visited, even if some failed
/// (check [`FetchReport::is_success`]).
///
/// # Errors
/// Returns `Err(ScrapeError)` when the output directory cannot be created,
/// the table cannot be read, or a row fails in fail-fast mode.
pub async fn download_and_convert<C: HttpFetch>(
    client: &C,
    metadata_file: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &FetchConfig,
) -> Result<FetchReport, ScrapeError> {
    let started = Instant::now();
    let metadata_file = metadata_file.as_ref();
    let output_dir = output_dir.as_ref();

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| ScrapeError::FileSystem {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    let rows = table::read_table(metadata_file).await?;
    info!(
        "Read {} rows from {}; writing text to {}",
        rows.len(),
        metadata_file.display(),
        output_dir.display()
    );

    let mut report = FetchReport::default();
    report.stats.total_rows = rows.len();
    if let Some(ref cb) = config.progress {
        cb.on_fetch_start(rows.len());
    }

    for row in &rows {
        let outcome = convert_row(client, row, output_dir, config).await;

        match &outcome {
            RowOutcome::Converted { chars } => {
                if let Some(ref cb) = config.progress {
                    cb.on_row_complete(&row.decision_id, *chars);
                }
            }
            RowOutcome::Skipped => {
                if let Some(ref cb) = config.progress {
                    cb.on_row_skipped(&row.decision_id);
                }
            }
            RowOutcome::Failed(error) => {
                warn!("Decision {} failed: {}", row.decision_id, error);
                if let Some(ref cb) = config.progress {
                    cb.on_row_error(&row.decision_id, &error.to_string());
                }
                if config.fail_fast {
                    return Err(ScrapeError::RowFailed {
                        decision_id: row.decision_id.clone(),
                        source: error.clone(),
                    });
                }
            }
        }

        report.record(&row.decision_id, &outcome);
    }

    if let Some(ref cb) = config.progress {
        cb.on_fetch_complete(&report.stats);
    }

    info!(
        "Fetch complete: {} converted, {} skipped, {} failed of {} rows in {}ms",
        report.stats.converted,
        report.stats.skipped,
        report.stats.failed,
        report.stats.total_rows,
        started.elapsed().as_millis()
    );

    Ok(report)
}

/// Process a single table row. Never returns an error: failures are
/// reported as [`RowOutcome::Failed`].
pub async fn convert_row<C: HttpFetch>(
    client: &C,
    row: &MetadataRecord,
    output_dir: &Path,
    config: &FetchConfig,
) -> RowOutcome {
    let decision_id = row.decision_id.trim();
    if decision_id.is_empty() {
        return RowOutcome::Failed(DecisionError::InvalidRow {
            detail: format!("empty decision_id for location '{}'", row.location),
        });
    }

    let txt_path = text_path(output_dir, decision_id);
    if txt_path.exists() {
        debug!("Skipping {}: already exists", txt_path.display());
        return RowOutcome::Skipped;
    }

    if let Some(ref cb) = config.progress {
        cb.on_row_start(decision_id);
    }

    match fetch_and_convert(client, decision_id, &row.location, &txt_path, config).await {
        Ok(chars) => {
            info!("Converted {} ({} chars)", decision_id, chars);
            RowOutcome::Converted { chars }
        }
        Err(e) => RowOutcome::Failed(e),
    }
}

async fn fetch_and_convert<C: HttpFetch>(
    client: &C,
    decision_id: &str,
    location: &str,
    txt_path: &Path,
    config: &FetchConfig,
) -> Result<usize, DecisionError> {
    let url = config
        .decision_url(location)
        .map_err(|e| DecisionError::InvalidRow {
            detail: e.to_string(),
        })?;

    sleep(config.request_delay()).await;

    debug!("Downloading {} from {}", decision_id, url);
    let bytes = client
        .get_bytes(url.as_str())
        .await
        .map_err(|e| DecisionError::Download {
            detail: e.to_string(),
        })?;
    extract::check_pdf_magic(&bytes)?;

    // Removed on drop if extraction fails.
    let pdf = write_temp_pdf(decision_id, &bytes)?;
    let text = extract::extract_text(pdf.path()).await?;
    // The `.txt` marks the row done, so the PDF must be gone before it exists.
    remove_temp_pdf(pdf)?;

    let cleaned = clean::clean_text(&text);
    write_text_atomic(txt_path, &cleaned).await?;

    Ok(cleaned.chars().count())
}

fn write_temp_pdf(
    decision_id: &str,
    bytes: &[u8],
) -> Result<tempfile::NamedTempFile, DecisionError> {
    let write_err = |e: std::io::Error| DecisionError::WriteFailed {
        path: PathBuf::from(format!("{decision_id}.pdf")),
        detail: e.to_string(),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(&format!("{decision_id}-"))
        .suffix(".pdf")
        .tempfile()
        .map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    Ok(tmp)
}

fn remove_temp_pdf(pdf: tempfile::NamedTempFile) -> Result<(), DecisionError> {
    let path = pdf.path().to_path_buf();
    pdf.close().map_err(|e| DecisionError::WriteFailed {
        path,
        detail: format!("could not delete temporary PDF: {e}"),
    })
}

/// Write to `{path}.tmp`, then rename, so a `.txt` under its final name is
/// always complete.
async fn write_text_atomic(path: &Path, text: &str) -> Result<(), DecisionError> {
    let write_err = |e: std::io::Error| DecisionError::WriteFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    };

    let tmp_path = path.with_extension("txt.tmp");
    if let Err(e) = tokio::fs::write(&tmp_path, text.as_bytes()).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_path_uses_decision_id() {
        assert_eq!(
            text_path(Path::new("out"), "DRN-1"),
            PathBuf::from("out").join("DRN-1.txt")
        );
    }

    #[tokio::test]
    async fn atomic_write_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("X1.txt");
        write_text_atomic(&path, "hello world").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello world");
        assert!(!dir.path().join("X1.txt.tmp").exists());
    }

    #[test]
    fn temp_pdf_is_removed_on_drop() {
        let tmp = write_temp_pdf("DRN-5", b"%PDF-1.4").unwrap();
        let path = tmp.path().to_path_buf();
        assert!(path.exists());
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("DRN-5-"));
        drop(tmp);
        assert!(!path.exists());
    }

    #[test]
    fn failed_temp_pdf_removal_is_reported() {
        let tmp = write_temp_pdf("DRN-6", b"%PDF-1.4").unwrap();
        let path = tmp.path().to_path_buf();
        std::fs::remove_file(&path).unwrap();

        let err = remove_temp_pdf(tmp).unwrap_err();

        assert!(matches!(err, DecisionError::WriteFailed { path: ref p, .. } if *p == path));
    }
}
