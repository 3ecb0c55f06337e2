//! Configuration types for the harvester and the fetcher.
//!
//! Every knob lives in one of three structs: [`HttpClientConfig`] for what is
//! sent with each request, [`HarvestConfig`] for search pagination and
//! [`FetchConfig`] for the download-and-convert batch. The two batch configs
//! are built through builders that validate URLs and bounds up front so a
//! typo in a base URL fails before the first request rather than on row 400.

use crate::error::ScrapeError;
use crate::progress::{FetchProgress, HarvestProgress};
use reqwest::Url;
use std::fmt;
use std::time::Duration;

/// Search results page of the decisions database.
pub const DEFAULT_SEARCH_URL: &str =
    "https://www.financial-ombudsman.org.uk/decisions-case-studies/ombudsman-decisions/search";

/// Base that decision `location` paths are resolved against.
pub const DEFAULT_DECISIONS_BASE_URL: &str = "https://www.financial-ombudsman.org.uk/";

/// User agent sent with every request. The site rejects the default
/// reqwest agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Output table written by the harvester and read by the fetcher.
pub const DEFAULT_METADATA_FILE: &str = "decisions.csv";

/// Directory holding one `{decision_id}.txt` per converted decision.
pub const DEFAULT_OUTPUT_DIR: &str = "decisions_txt";

/// Results per search page; the site pages in steps of ten.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Upper bound on search requests per harvest run.
pub const DEFAULT_MAX_PAGES: usize = 500;

/// Pause before each decision download.
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

// ── HTTP ─────────────────────────────────────────────────────────────────

/// Per-request HTTP settings, passed explicitly to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// `User-Agent` header value. Default: [`DEFAULT_USER_AGENT`].
    pub user_agent: String,
    /// Whole-request timeout in seconds. Default: 60.
    pub timeout_secs: u64,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 60,
        }
    }
}

impl HttpClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ── Harvest ──────────────────────────────────────────────────────────────

/// Configuration for a metadata harvest run.
#[derive(Clone)]
pub struct HarvestConfig {
    /// Search results endpoint. Default: [`DEFAULT_SEARCH_URL`].
    pub search_url: String,

    /// Offset increment between pages, and the entry count of a full page.
    /// Default: 10.
    ///
    /// A page returning fewer entries than this is the last one.
    pub page_size: usize,

    /// Maximum number of search requests before giving up. Default: 500.
    pub max_pages: usize,

    /// Optional observer for per-page events.
    pub progress: Option<HarvestProgress>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_SEARCH_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            progress: None,
        }
    }
}

impl fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("search_url", &self.search_url)
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn HarvestProgressCallback>"))
            .finish()
    }
}

impl HarvestConfig {
    pub fn builder() -> HarvestConfigBuilder {
        HarvestConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`HarvestConfig`].
#[derive(Debug)]
pub struct HarvestConfigBuilder {
    config: HarvestConfig,
}

impl HarvestConfigBuilder {
    pub fn search_url(mut self, url: impl Into<String>) -> Self {
        self.config.search_url = url.into();
        self
    }

    pub fn page_size(mut self, n: usize) -> Self {
        self.config.page_size = n;
        self
    }

    pub fn max_pages(mut self, n: usize) -> Self {
        self.config.max_pages = n;
        self
    }

    pub fn progress(mut self, cb: HarvestProgress) -> Self {
        self.config.progress = Some(cb);
        self
    }

    pub fn build(self) -> Result<HarvestConfig, ScrapeError> {
        let c = &self.config;
        parse_base_url(&c.search_url)?;
        if c.page_size == 0 {
            return Err(ScrapeError::InvalidConfig("Page size must be ≥ 1".into()));
        }
        if c.max_pages == 0 {
            return Err(ScrapeError::InvalidConfig("Max pages must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}

// ── Fetch ────────────────────────────────────────────────────────────────

/// Configuration for a download-and-convert run.
#[derive(Clone)]
pub struct FetchConfig {
    /// Base URL decision locations are joined onto.
    /// Default: [`DEFAULT_DECISIONS_BASE_URL`].
    pub decisions_base_url: String,

    /// Politeness delay before every download, in milliseconds. Default: 1000.
    ///
    /// Rows that are skipped because their text file exists do not wait.
    pub request_delay_ms: u64,

    /// Abort the batch on the first failed row. Default: false.
    pub fail_fast: bool,

    /// Optional observer for per-row events.
    pub progress: Option<FetchProgress>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            decisions_base_url: DEFAULT_DECISIONS_BASE_URL.to_string(),
            request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            fail_fast: false,
            progress: None,
        }
    }
}

impl fmt::Debug for FetchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchConfig")
            .field("decisions_base_url", &self.decisions_base_url)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("fail_fast", &self.fail_fast)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn FetchProgressCallback>"))
            .finish()
    }
}

impl FetchConfig {
    pub fn builder() -> FetchConfigBuilder {
        FetchConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Resolve a decision `location` (usually an absolute path) against
    /// [`FetchConfig::decisions_base_url`].
    pub fn decision_url(&self, location: &str) -> Result<Url, ScrapeError> {
        let base = parse_base_url(&self.decisions_base_url)?;
        base.join(location).map_err(|e| ScrapeError::InvalidUrl {
            url: location.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Builder for [`FetchConfig`].
#[derive(Debug)]
pub struct FetchConfigBuilder {
    config: FetchConfig,
}

impl FetchConfigBuilder {
    pub fn decisions_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.decisions_base_url = url.into();
        self
    }

    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.request_delay_ms = ms;
        self
    }

    pub fn fail_fast(mut self, v: bool) -> Self {
        self.config.fail_fast = v;
        self
    }

    pub fn progress(mut self, cb: FetchProgress) -> Self {
        self.config.progress = Some(cb);
        self
    }

    pub fn build(self) -> Result<FetchConfig, ScrapeError> {
        parse_base_url(&self.config.decisions_base_url)?;
        Ok(self.config)
    }
}

fn parse_base_url(url: &str) -> Result<Url, ScrapeError> {
    let parsed = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScrapeError::InvalidUrl {
            url: url.to_string(),
            reason: "only http and https are supported".into(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn harvest_defaults() {
        let c = HarvestConfig::builder().build().unwrap();
        assert_eq!(c.page_size, 10);
        assert_eq!(c.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(c.search_url, DEFAULT_SEARCH_URL);
    }

    #[test]
    fn harvest_rejects_zero_page_size() {
        let err = HarvestConfig::builder().page_size(0).build().unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidConfig(_)));
    }

    #[test]
    fn harvest_rejects_non_http_url() {
        let err = HarvestConfig::builder()
            .search_url("ftp://example.org/search")
            .build()
            .unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidUrl { .. }));
    }

    #[test]
    fn decision_url_joins_absolute_path() {
        let c = FetchConfig::default();
        let url = c.decision_url("/decisions/DRN-1234567.pdf").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.financial-ombudsman.org.uk/decisions/DRN-1234567.pdf"
        );
    }

    #[test]
    fn decision_url_joins_relative_path() {
        let c = FetchConfig::builder()
            .decisions_base_url("http://127.0.0.1:8080/files/")
            .build()
            .unwrap();
        let url = c.decision_url("abc/X1.pdf").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/files/abc/X1.pdf");
    }

    #[test]
    fn fetch_rejects_garbage_base() {
        let err = FetchConfig::builder()
            .decisions_base_url("not a url")
            .build()
            .unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidUrl { .. }));
    }

    #[test]
    fn http_defaults_use_browser_agent() {
        let c = HttpClientConfig::default();
        assert_eq!(c.user_agent, "Mozilla/5.0");
        assert_eq!(c.timeout(), Duration::from_secs(60));
    }
}
