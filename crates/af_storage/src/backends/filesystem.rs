use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use af_core::{DocumentStore, Result};
use tracing::debug;

use super::check_name;

/// Writes documents as files directly under one directory, typically a
/// Jekyll `_posts/`. The directory is created on first write.
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    root: PathBuf,
}

impl FileSystemStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> Result<PathBuf> {
        check_name(name)?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl DocumentStore for FileSystemStore {
    fn location(&self, name: &str) -> String {
        self.root.join(name).display().to_string()
    }

    async fn read_document(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_of(name)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_document(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path_of(name)?;
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(&path, bytes).await?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }
}
