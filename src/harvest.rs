//! Metadata harvesting: walk the search result pages and collect records.
//!
//! ## Why a stream?
//!
//! Result sets span anywhere from zero to thousands of pages. Exposing them
//! as a lazy [`PageStream`] lets callers stop early, print progress per page,
//! or persist pages incrementally, while [`harvest`] stays a simple "drain
//! the stream" wrapper. The stream ends on the first empty page (the
//! end-of-results sentinel), on a short page, on the `max_pages` safety cap,
//! or right after yielding an error.

use crate::config::HarvestConfig;
use crate::error::ScrapeError;
use crate::http::HttpFetch;
use crate::output::{HarvestOutput, HarvestStats, SearchPage};
use crate::pipeline::{search, table};
use crate::query::SearchQuery;
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tokio_stream::Stream;
use tracing::{debug, info, warn};

/// A boxed stream of parsed search pages.
pub type PageStream<'a> = Pin<Box<dyn Stream<Item = Result<SearchPage, ScrapeError>> + Send + 'a>>;

/// Where the next iteration of the page stream stands.
enum Cursor {
    /// Request the page at this offset; `requested` pages so far.
    Next { start: usize, requested: usize },
    Done,
}

/// Lazily fetch and parse search result pages, starting at offset 0.
///
/// Only non-empty pages are yielded. Errors are yielded once and end the
/// stream; there is no retry.
pub fn search_pages<'a, C: HttpFetch>(
    client: &'a C,
    query: &'a SearchQuery,
    config: &'a HarvestConfig,
) -> PageStream<'a> {
    let cursor = Cursor::Next {
        start: 0,
        requested: 0,
    };

    Box::pin(stream::unfold(cursor, move |cursor| async move {
        let Cursor::Next { start, requested } = cursor else {
            return None;
        };

        if requested >= config.max_pages {
            warn!(
                "Stopping at offset {} after {} pages (max_pages reached)",
                start, requested
            );
            return None;
        }

        let params = query.to_params(start);
        debug!("Requesting search page at offset {}: {:?}", start, params);

        let html = match client.get_text(&config.search_url, &params).await {
            Ok(html) => html,
            Err(e) => return Some((Err(e), Cursor::Done)),
        };

        let page = match search::parse_results_page(&html, start) {
            Ok(page) => page,
            Err(e) => return Some((Err(e), Cursor::Done)),
        };

        if page.is_empty() {
            info!("Finished scraping at offset {}", start);
            return None;
        }

        info!("Scraped {} entries from offset {}", page.len(), start);

        let next = if page.len() < config.page_size {
            info!("Short page at offset {}; last page reached", start);
            Cursor::Done
        } else {
            Cursor::Next {
                start: start + config.page_size,
                requested: requested + 1,
            }
        };

        Some((Ok(page), next))
    }))
}

/// Run a complete harvest and return every record in page order.
///
/// # Errors
/// The first network or page-layout error aborts the run; records gathered
/// so far are discarded with it.
pub async fn harvest<C: HttpFetch>(
    client: &C,
    query: &SearchQuery,
    config: &HarvestConfig,
) -> Result<HarvestOutput, ScrapeError> {
    let started = Instant::now();
    info!(
        "Starting harvest: {} → {}, {} sector(s), upheld={:?}",
        query.date_from,
        query.date_to,
        query.sectors.len(),
        query.upheld
    );

    let counted = CountingClient::new(client);
    let mut output = HarvestOutput::default();
    let mut pages = search_pages(&counted, query, config);

    while let Some(page) = pages.next().await {
        let page = page?;
        output.stats.pages_scraped += 1;

        if let Some(ref cb) = config.progress {
            cb.on_page(page.start, page.len());
        }

        for error in &page.malformed {
            warn!("Skipping malformed entry at offset {}: {}", page.start, error);
            if let Some(ref cb) = config.progress {
                cb.on_entry_skipped(page.start, error);
            }
        }

        output.records.extend(page.records);
        output.malformed.extend(page.malformed);
    }

    output.stats.records = output.records.len();
    output.stats.malformed = output.malformed.len();
    output.stats.requests = counted.requests();

    if let Some(ref cb) = config.progress {
        cb.on_harvest_complete(output.stats.records);
    }

    info!(
        "Harvest complete: {} records, {} malformed, {} requests, {}ms",
        output.stats.records,
        output.stats.malformed,
        output.stats.requests,
        started.elapsed().as_millis()
    );

    Ok(output)
}

/// Harvest and write the records to a CSV table at `path`.
///
/// When no records were found nothing is written and the returned stats
/// show zero records.
pub async fn harvest_to_file<C: HttpFetch>(
    client: &C,
    query: &SearchQuery,
    config: &HarvestConfig,
    path: impl AsRef<Path>,
) -> Result<HarvestStats, ScrapeError> {
    let path = path.as_ref();
    let output = harvest(client, query, config).await?;

    if output.records.is_empty() {
        info!("No results found; {} not written", path.display());
        return Ok(output.stats);
    }

    info!("Writing {} entries to {}", output.records.len(), path.display());
    table::write_table(&output.records, path).await?;
    Ok(output.stats)
}

/// Wraps a client and counts the search requests sent through it.
struct CountingClient<'a, C> {
    inner: &'a C,
    requests: AtomicUsize,
}

impl<'a, C: HttpFetch> CountingClient<'a, C> {
    fn new(inner: &'a C) -> Self {
        Self {
            inner,
            requests: AtomicUsize::new(0),
        }
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl<C: HttpFetch> HttpFetch for CountingClient<'_, C> {
    async fn get_text(&self, url: &str, query: &[(String, String)]) -> Result<String, ScrapeError> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.inner.get_text(url, query).await
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        self.inner.get_bytes(url).await
    }
}
