//! HTTP access for search pages and decision PDFs.
//!
//! The harvester and fetcher talk to the network only through [`HttpFetch`],
//! so tests can drive them with in-memory fakes. [`ReqwestFetcher`] is the
//! real implementation; its user agent and timeout come from an explicit
//! [`HttpClientConfig`] rather than process-wide state.

use crate::config::HttpClientConfig;
use crate::error::ScrapeError;
use std::future::Future;
use tracing::debug;

/// Minimal GET interface used by the pipeline.
///
/// Implementations must map connection failures to
/// [`ScrapeError::Network`] and non-success statuses to
/// [`ScrapeError::HttpStatus`]. No retries.
pub trait HttpFetch: Send + Sync {
    /// GET `url` with `query` parameters and return the body as text.
    fn get_text(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> impl Future<Output = Result<String, ScrapeError>> + Send;

    /// GET `url` and return the raw body.
    fn get_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ScrapeError>> + Send;
}

/// [`HttpFetch`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(config: &HttpClientConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| ScrapeError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn send(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<reqwest::Response, ScrapeError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: response.url().to_string(),
                status: status.as_u16(),
            });
        }
        debug!("GET {} → {}", response.url(), status);
        Ok(response)
    }
}

impl HttpFetch for ReqwestFetcher {
    async fn get_text(&self, url: &str, query: &[(String, String)]) -> Result<String, ScrapeError> {
        self.send(url, query)
            .await?
            .text()
            .await
            .map_err(|e| network_error(url, e))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let bytes = self
            .send(url, &[])
            .await?
            .bytes()
            .await
            .map_err(|e| network_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

fn network_error(url: &str, e: reqwest::Error) -> ScrapeError {
    let reason = if e.is_timeout() {
        "timed out".to_string()
    } else {
        e.to_string()
    };
    ScrapeError::Network {
        url: url.to_string(),
        reason,
    }
}
