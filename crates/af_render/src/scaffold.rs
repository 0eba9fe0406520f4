//! Rendering hand-written article fixtures without going through extraction.

use std::path::Path;

use af_core::{Article, DocumentStore, Result};
use tracing::info;

use crate::renderer::DocumentRenderer;

pub fn parse_article_fixture(json: &str) -> Result<Article> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_article_fixture(path: &Path) -> Result<Article> {
    let json = std::fs::read_to_string(path)?;
    parse_article_fixture(&json)
}

/// Renders the fixture at `fixture` into `store`, returning where it was written.
pub async fn scaffold(fixture: &Path, store: &dyn DocumentStore) -> Result<String> {
    let article = load_article_fixture(fixture)?;
    let renderer = DocumentRenderer::new();
    let bytes = renderer.render(&article)?;
    let name = renderer.filename(&article);

    store.write_document(&name, &bytes).await?;
    let location = store.location(&name);
    info!("Scaffolded {} -> {}", article.title(), location);
    Ok(location)
}
