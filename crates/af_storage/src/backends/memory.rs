use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use af_core::{DocumentStore, Result};
use tokio::sync::RwLock;

use super::check_name;

/// Keeps documents in a map. Clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of stored documents, sorted.
    pub async fn names(&self) -> Vec<String> {
        self.documents.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn location(&self, name: &str) -> String {
        format!("memory://{}", name)
    }

    async fn read_document(&self, name: &str) -> Result<Option<Vec<u8>>> {
        check_name(name)?;
        let documents = self.documents.read().await;
        Ok(documents.get(name).cloned())
    }

    async fn write_document(&self, name: &str, bytes: &[u8]) -> Result<()> {
        check_name(name)?;
        let mut documents = self.documents.write().await;
        documents.insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
