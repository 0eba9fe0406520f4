use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Extraction failed ({adapter} adapter): {source}")]
    Extraction {
        adapter: String,
        #[source]
        source: ExtractionError,
    },

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("No adapter can handle URL: {0}")]
    NoAdapter(String),

    #[error("Invalid article: {0}")]
    InvalidArticle(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    pub fn extraction(adapter: impl Into<String>, source: ExtractionError) -> Self {
        Error::Extraction {
            adapter: adapter.into(),
            source,
        }
    }

    /// Configuration errors abort a whole run; everything else is scoped to one item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

/// Raised by an adapter that matched a URL but could not build an article from it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no title could be determined")]
    MissingTitle,

    #[error("no publication date could be determined")]
    MissingDate,

    #[error("article body is empty after normalization")]
    EmptyBody,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("field `{field}` contains characters that cannot be encoded")]
    Unencodable { field: &'static str },

    #[error("metadata serialization failed: {0}")]
    Serialization(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("transport failure: {0}")]
    Transport(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("adapter registry is empty")]
    EmptyRegistry,

    #[error("Unknown adapter '{name}'. Available adapters: {}", .available.join(", "))]
    UnknownAdapter { name: String, available: Vec<String> },

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
