use async_trait::async_trait;
use crate::Result;

/// Where rendered documents are persisted, keyed by file name.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human readable location of a document, used in batch reports
    fn location(&self, name: &str) -> String;

    /// Returns the stored bytes, or `None` when nothing is stored under `name`
    async fn read_document(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `bytes` under `name`, replacing any previous document
    async fn write_document(&self, name: &str, bytes: &[u8]) -> Result<()>;
}
