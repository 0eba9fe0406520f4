pub mod fetch;
pub mod logging;
pub mod options;
pub mod orchestrator;
pub mod report;
pub mod urls;

pub use fetch::{FetchedPage, Fetcher, HttpFetcher, StaticFetcher};
pub use logging::{init_logging, Logger};
pub use options::{HtmlSource, IngestItem, IngestOptions};
pub use orchestrator::{CancellationFlag, IngestOrchestrator};
pub use report::{
    BatchResult, BatchSummary, ItemError, ItemErrorKind, ItemOutcome, ItemReport, SkipReason,
    WriteStatus,
};
pub use urls::{parse_url_list, read_url_list};
