//! PDF text extraction via lopdf.
//!
//! Parsing a PDF is CPU-bound and synchronous, so the work runs inside
//! `spawn_blocking` to keep the runtime's worker threads free. Pages are read
//! in ascending page-number order and their text concatenated as-is; any
//! cleanup is left to [`crate::pipeline::clean`].

use crate::error::DecisionError;
use lopdf::Document;
use std::path::Path;
use tracing::debug;

/// Magic bytes every PDF starts with.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Check the `%PDF` header of a downloaded body.
pub fn check_pdf_magic(bytes: &[u8]) -> Result<(), DecisionError> {
    if bytes.starts_with(PDF_MAGIC) {
        Ok(())
    } else {
        Err(DecisionError::NotAPdf {
            magic: bytes.iter().take(4).copied().collect(),
        })
    }
}

/// Extract the text of every page of the PDF at `pdf_path`.
pub async fn extract_text(pdf_path: &Path) -> Result<String, DecisionError> {
    let path = pdf_path.to_path_buf();

    tokio::task::spawn_blocking(move || extract_text_blocking(&path))
        .await
        .map_err(|e| DecisionError::MalformedPdf {
            detail: format!("extraction task panicked: {e}"),
        })?
}

/// Blocking implementation of text extraction.
fn extract_text_blocking(pdf_path: &Path) -> Result<String, DecisionError> {
    let document = Document::load(pdf_path).map_err(|e| DecisionError::MalformedPdf {
        detail: e.to_string(),
    })?;
    extract_document_text(&document)
}

/// Concatenate the text of all pages of a loaded document.
pub fn extract_document_text(document: &Document) -> Result<String, DecisionError> {
    // BTreeMap keyed by 1-based page number, so iteration is in page order.
    let pages = document.get_pages();
    if pages.is_empty() {
        return Err(DecisionError::MalformedPdf {
            detail: "document has no pages".into(),
        });
    }

    let mut text = String::new();
    for &page_num in pages.keys() {
        let page_text =
            document
                .extract_text(&[page_num])
                .map_err(|e| DecisionError::MalformedPdf {
                    detail: format!("page {page_num}: {e}"),
                })?;
        debug!("Extracted page {} → {} chars", page_num, page_text.len());
        text.push_str(&page_text);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_accepts_pdf_header() {
        assert!(check_pdf_magic(b"%PDF-1.7\n...").is_ok());
    }

    #[test]
    fn magic_rejects_html() {
        let err = check_pdf_magic(b"<!DOCTYPE html>").unwrap_err();
        match err {
            DecisionError::NotAPdf { magic } => assert_eq!(magic, b"<!DO".to_vec()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn magic_rejects_empty_body() {
        assert!(matches!(
            check_pdf_magic(b""),
            Err(DecisionError::NotAPdf { magic }) if magic.is_empty()
        ));
    }

    #[test]
    fn document_without_pages_is_malformed() {
        let err = extract_document_text(&Document::new()).unwrap_err();
        assert!(matches!(err, DecisionError::MalformedPdf { .. }));
    }

    #[tokio::test]
    async fn garbage_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\nthis is not really a pdf").unwrap();
        let err = extract_text(&path).await.unwrap_err();
        assert!(matches!(err, DecisionError::MalformedPdf { .. }));
    }
}
