use std::collections::BTreeMap;
use std::time::Duration;

use af_core::FetchError;
use async_trait::async_trait;
use tracing::debug;

pub use af_config::schema::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    /// Where the request ended up after redirects.
    pub final_url: String,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// One GET per URL with a timeout and user agent. No retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_USER_AGENT)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(FetchedPage { html, final_url })
    }
}

/// Serves canned pages. Unknown URLs answer 404.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: BTreeMap<String, FetchedPage>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchedPage {
                html: html.to_string(),
                final_url: url.to_string(),
            },
        );
        self
    }

    pub fn with_redirect(mut self, url: &str, final_url: &str, html: &str) -> Self {
        self.pages.insert(
            url.to_string(),
            FetchedPage {
                html: html.to_string(),
                final_url: final_url.to_string(),
            },
        );
        self
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.pages.get(url).cloned().ok_or(FetchError::Status(404))
    }
}
