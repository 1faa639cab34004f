//! Page fetching: the [`PageFetcher`] seam, its HTTP implementation, and an
//! in-memory implementation for offline replays.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use ao3recs_shared::{ArchiveConfig, RecsError, Result};

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 5;

/// Retrieves the raw HTML of an archive page.
///
/// Implementations do not retry; any failure aborts the caller's strategy.
pub trait PageFetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>>;
}

impl<T: PageFetcher> PageFetcher for &T {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String>> {
        (**self).fetch(url)
    }
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// Fetches pages over HTTP with a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the configured user agent and timeout.
    pub fn new(config: &ArchiveConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RecsError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!("fetching page");

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| RecsError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecsError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| RecsError::Network(format!("{url}: body read failed: {e}")))
    }
}

// ---------------------------------------------------------------------------
// MemoryFetcher
// ---------------------------------------------------------------------------

/// Serves pages from an in-memory map keyed by absolute URL.
///
/// Every request is logged, so callers can inspect the exact fetch sequence.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, String>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the body served for `url`, replacing any earlier one.
    pub fn insert(&mut self, url: &Url, body: impl Into<String>) {
        self.pages.insert(url.as_str().to_string(), body.into());
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl PageFetcher for MemoryFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        self.requests.borrow_mut().push(url.as_str().to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| RecsError::Network(format!("{url}: HTTP 404 Not Found")))
    }
}
