use af_core::{Article, ConfigurationError, Error, ExtractionError, Result, SlugGenerator, SlugSet};
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::adapters::{AdapterKind, ExtractContext, SourceAdapter};

/// One line of a selection explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionTrace {
    pub name: &'static str,
    pub priority: u8,
    pub can_handle: bool,
    pub selected: bool,
    /// Trial extraction result, only when HTML was supplied and the adapter
    /// would have been tried.
    pub extraction: Option<ExtractionPreview>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionPreview {
    Extracted { title: String, date: NaiveDate },
    Failed(ExtractionError),
}

/// Ordered adapter registry. The first registered adapter that can handle a
/// URL wins, so specific adapters go before the fallback.
#[derive(Debug, Clone, Default)]
pub struct AdapterDispatcher {
    adapters: Vec<AdapterKind>,
    forced: Option<usize>,
    slugs: SlugGenerator,
}

impl AdapterDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// `socket`, `substack`, then the generic fallback.
    pub fn builtin() -> Self {
        let mut dispatcher = Self::new();
        for adapter in AdapterKind::builtin() {
            dispatcher.register(adapter);
        }
        dispatcher
    }

    pub fn register(&mut self, adapter: AdapterKind) {
        debug!("Registering adapter {}", adapter.name());
        self.adapters.push(adapter);
    }

    /// Routes every URL to the adapter called `name`.
    pub fn with_forced(mut self, name: &str) -> std::result::Result<Self, ConfigurationError> {
        let index = self
            .adapters
            .iter()
            .position(|a| a.name() == name)
            .ok_or_else(|| ConfigurationError::UnknownAdapter {
                name: name.to_string(),
                available: self.available_names(),
            })?;
        self.forced = Some(index);
        Ok(self)
    }

    pub fn adapters(&self) -> &[AdapterKind] {
        &self.adapters
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&AdapterKind> {
        self.adapters.iter().find(|a| a.name() == name)
    }

    /// Registered adapter names, sorted.
    pub fn available_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.iter().map(|a| a.name().to_string()).collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn select(&self, url: &str) -> Result<&AdapterKind> {
        let index = self.select_index(url)?;
        Ok(&self.adapters[index])
    }

    fn select_index(&self, url: &str) -> Result<usize> {
        if self.adapters.is_empty() {
            return Err(ConfigurationError::EmptyRegistry.into());
        }
        if let Some(index) = self.forced {
            return Ok(index);
        }
        self.adapters
            .iter()
            .position(|a| a.can_handle(url))
            .ok_or_else(|| Error::NoAdapter(url.to_string()))
    }

    pub fn explain(&self, url: &str) -> Vec<SelectionTrace> {
        self.trace(url, None)
    }

    /// Like [`explain`](Self::explain), and also runs every adapter that could
    /// be chosen for `url` over `html`.
    pub fn explain_with(&self, url: &str, html: &str, ctx: &ExtractContext) -> Vec<SelectionTrace> {
        self.trace(url, Some((html, ctx)))
    }

    fn trace(&self, url: &str, page: Option<(&str, &ExtractContext)>) -> Vec<SelectionTrace> {
        let selected = self.select_index(url).ok();
        self.adapters
            .iter()
            .enumerate()
            .map(|(index, adapter)| {
                let metadata = adapter.metadata();
                let can_handle = adapter.can_handle(url);
                let candidate = match self.forced {
                    Some(forced) => forced == index,
                    None => can_handle,
                };
                let extraction = page.filter(|_| candidate).map(|(html, ctx)| {
                    match adapter.extract_with(url, html, ctx) {
                        Ok(article) => ExtractionPreview::Extracted {
                            title: article.title,
                            date: article.date,
                        },
                        Err(e) => ExtractionPreview::Failed(e),
                    }
                });
                SelectionTrace {
                    name: metadata.name,
                    priority: metadata.priority,
                    can_handle,
                    selected: selected == Some(index),
                    extraction,
                }
            })
            .collect()
    }

    pub fn dispatch(&self, url: &str, html: &str, existing_slugs: &SlugSet) -> Result<Article> {
        self.dispatch_with(url, html, &ExtractContext::default(), existing_slugs)
    }

    /// Extracts with the selected adapter, then assigns a slug that is free in
    /// `existing_slugs`. The set itself is left to the caller to update.
    pub fn dispatch_with(
        &self,
        url: &str,
        html: &str,
        ctx: &ExtractContext,
        existing_slugs: &SlugSet,
    ) -> Result<Article> {
        let adapter = self.select(url)?;
        info!("Using {} adapter for {}", adapter.name(), url);

        let extracted = adapter
            .extract_with(url, html, ctx)
            .map_err(|e| Error::extraction(adapter.name(), e))?;

        let slug = self
            .slugs
            .generate(&extracted.title, extracted.date, existing_slugs);
        Ok(extracted.into_article(slug))
    }
}
