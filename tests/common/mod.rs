//! Shared fixtures for the integration tests: an in-memory decisions site
//! and a tiny PDF builder.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use ombudsman_decisions::{HttpFetch, MetadataRecord, ScrapeError};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Instant;

pub const SEARCH_URL: &str = "http://decisions.test/search";
pub const BASE_URL: &str = "http://decisions.test/";
pub const PAGE_SIZE: usize = 10;

/// Route logs to the test harness when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fake site serving `entries` search results in pages of ten, plus PDFs
/// keyed by absolute URL. Every request is recorded.
#[derive(Default)]
pub struct FakeSite {
    pub entries: usize,
    /// Absolute result indices rendered without a tag span.
    pub malformed: HashSet<usize>,
    /// Offsets answered with a 500.
    pub failing_offsets: HashSet<usize>,
    pub pdfs: HashMap<String, Vec<u8>>,
    pub search_requests: Mutex<Vec<Vec<(String, String)>>>,
    pub pdf_requests: Mutex<Vec<String>>,
    pub pdf_requested_at: Mutex<Vec<Instant>>,
}

impl FakeSite {
    pub fn with_entries(entries: usize) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn with_pdf(mut self, location: &str, bytes: Vec<u8>) -> Self {
        let url = format!("{}{}", BASE_URL, location.trim_start_matches('/'));
        self.pdfs.insert(url, bytes);
        self
    }

    pub fn search_offsets(&self) -> Vec<usize> {
        self.search_requests
            .lock()
            .unwrap()
            .iter()
            .map(|params| {
                params
                    .iter()
                    .find(|(k, _)| k == "Start")
                    .map(|(_, v)| v.parse().unwrap())
                    .unwrap()
            })
            .collect()
    }

    pub fn pdf_request_count(&self) -> usize {
        self.pdf_requests.lock().unwrap().len()
    }

    fn render_page(&self, start: usize) -> String {
        let end = (start + PAGE_SIZE).min(self.entries);
        let items: Vec<String> = (start..end)
            .map(|i| {
                let tag = if self.malformed.contains(&i) {
                    String::new()
                } else {
                    r#"<span class="search-result__tag">Insurance</span>"#.to_string()
                };
                format!(
                    r#"<li class="search-result">
  <a href="/decisions/DRN-{i:07}.pdf">
    <h4>Complaint number {i}</h4>
    <div class="search-result__info-main">
      <p>0{day} March 2024</p>
      <p>Company {i} Ltd</p>
      <p>Upheld</p>
      <p>Buildings insurance</p>
    </div>
    {tag}
  </a>
</li>"#,
                    day = i % 9 + 1
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html><body>
<div class="search-results-holder">
  <p>{} results</p>
  <ul class="search-results">
{}
  </ul>
</div>
</body></html>"#,
            self.entries,
            items.join("\n")
        )
    }
}

impl HttpFetch for FakeSite {
    async fn get_text(&self, url: &str, query: &[(String, String)]) -> Result<String, ScrapeError> {
        assert_eq!(url, SEARCH_URL);
        self.search_requests.lock().unwrap().push(query.to_vec());

        let start: usize = query
            .iter()
            .find(|(k, _)| k == "Start")
            .and_then(|(_, v)| v.parse().ok())
            .expect("Start parameter");
        if self.failing_offsets.contains(&start) {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: 500,
            });
        }
        Ok(self.render_page(start))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        self.pdf_requests.lock().unwrap().push(url.to_string());
        self.pdf_requested_at.lock().unwrap().push(Instant::now());
        self.pdfs
            .get(url)
            .cloned()
            .ok_or_else(|| ScrapeError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// Build a PDF with one line of text per page.
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn record(decision_id: &str) -> MetadataRecord {
    MetadataRecord {
        decision_id: decision_id.to_string(),
        location: format!("/decisions/{decision_id}.pdf"),
        title: format!("Complaint {decision_id}"),
        date: "01 March 2024".to_string(),
        company: "Acme Ltd".to_string(),
        decision: "Upheld".to_string(),
        extras: String::new(),
        tag: "Insurance".to_string(),
    }
}

/// Collapse whitespace runs so page and line breaks don't matter.
pub fn words(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
