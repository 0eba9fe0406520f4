use af_config::schema::DEFAULT_MAX_HTML_BYTES;
use af_config::ArtifactorConfig;
use af_sources::ExtractContext;
use chrono::NaiveDate;

/// Where an item's HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlSource {
    /// Fetched from the item's URL
    Live,
    /// Supplied by the caller
    Fixture(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestItem {
    pub url: String,
    pub html: HtmlSource,
}

impl IngestItem {
    pub fn live(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: HtmlSource::Live,
        }
    }

    pub fn fixture(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: HtmlSource::Fixture(html.into()),
        }
    }

    pub fn needs_fetch(&self) -> bool {
        self.html == HtmlSource::Live
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Only the first `limit` items are processed.
    pub limit: Option<usize>,
    /// Run everything except writing documents.
    pub dry_run: bool,
    /// Used as every item's HTML, in place of fetching.
    pub html_fixture: Option<String>,
    pub allow_network: bool,
    pub force_adapter: Option<String>,
    pub fallback_date: Option<NaiveDate>,
    /// Skip items whose canonical URL was already processed in the batch.
    pub dedupe: bool,
    /// Items with more HTML than this are skipped.
    pub max_html_bytes: Option<usize>,
    /// Log the adapter selection for each item.
    pub explain: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            limit: None,
            dry_run: false,
            html_fixture: None,
            allow_network: true,
            force_adapter: None,
            fallback_date: None,
            dedupe: true,
            max_html_bytes: Some(DEFAULT_MAX_HTML_BYTES),
            explain: false,
        }
    }
}

impl IngestOptions {
    /// Options carrying the config's ingest and input settings. Per-run
    /// flags (limit, dry run, fixture, explain) start off.
    pub fn from_config(config: &ArtifactorConfig) -> Self {
        Self {
            allow_network: config.input.allow_network,
            force_adapter: config.ingest.force_adapter.clone(),
            fallback_date: config.fallback_date(),
            dedupe: config.dedupe(),
            max_html_bytes: Some(config.ingest.max_html_bytes),
            ..Self::default()
        }
    }

    pub fn extract_context(&self) -> ExtractContext {
        ExtractContext {
            fallback_date: self.fallback_date,
        }
    }
}
