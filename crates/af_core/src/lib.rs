pub mod error;
pub mod slug;
pub mod storage;
pub mod types;

pub use error::{ConfigurationError, Error, ExtractionError, FetchError, RenderError, Result};
pub use slug::{SlugGenerator, SlugSet};
pub use storage::DocumentStore;
pub use types::{Article, ExtractedArticle, DATE_FORMAT};
