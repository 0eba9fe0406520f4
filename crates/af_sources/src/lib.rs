pub mod adapters;
pub mod dispatcher;
pub mod normalizer;

pub use adapters::{AdapterKind, AdapterMetadata, ExtractContext, SourceAdapter};
pub use dispatcher::{AdapterDispatcher, ExtractionPreview, SelectionTrace};
pub use normalizer::{BoilerplateRules, ContentNormalizer};
