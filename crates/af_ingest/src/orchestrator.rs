use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use af_core::{ConfigurationError, DocumentStore, Error, Result, SlugSet};
use af_render::DocumentRenderer;
use af_sources::{AdapterDispatcher, ExtractionPreview, SourceAdapter};

use crate::fetch::Fetcher;
use crate::logging::Logger;
use crate::options::{HtmlSource, IngestItem, IngestOptions};
use crate::report::{
    BatchResult, ItemError, ItemErrorKind, ItemOutcome, ItemReport, SkipReason, WriteStatus,
};

/// Stops a run between items once set. Clones share the flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What one run has claimed so far. Only successfully written items count.
#[derive(Debug, Default)]
struct RunState {
    existing_slugs: SlugSet,
    seen_urls: BTreeMap<String, usize>,
}

/// Runs a batch of items through fetch, dispatch, render and persist, one
/// item at a time in input order.
pub struct IngestOrchestrator {
    dispatcher: AdapterDispatcher,
    store: Arc<dyn DocumentStore>,
    fetcher: Option<Arc<dyn Fetcher>>,
    renderer: DocumentRenderer,
    cancellation: CancellationFlag,
    logger: Logger,
}

impl IngestOrchestrator {
    pub fn new(dispatcher: AdapterDispatcher, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            dispatcher,
            store,
            fetcher: None,
            renderer: DocumentRenderer::new(),
            cancellation: CancellationFlag::new(),
            logger: Logger::new(),
        }
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Checks everything that would make the whole run pointless, and returns
    /// the dispatcher the run should use.
    pub fn validate(
        &self,
        items: &[IngestItem],
        options: &IngestOptions,
    ) -> std::result::Result<AdapterDispatcher, ConfigurationError> {
        if self.dispatcher.is_empty() {
            return Err(ConfigurationError::EmptyRegistry);
        }
        if options.limit == Some(0) {
            return Err(ConfigurationError::InvalidOption(
                "limit must be at least 1".to_string(),
            ));
        }
        if options.max_html_bytes == Some(0) {
            return Err(ConfigurationError::InvalidOption(
                "max_html_bytes must be at least 1".to_string(),
            ));
        }
        if let Some(fixture) = &options.html_fixture {
            if fixture.trim().is_empty() {
                return Err(ConfigurationError::InvalidOption(
                    "html fixture is empty".to_string(),
                ));
            }
        }

        let needs_fetch = options.html_fixture.is_none() && items.iter().any(IngestItem::needs_fetch);
        if needs_fetch && !options.allow_network {
            return Err(ConfigurationError::InvalidOption(
                "network access is disabled but some items have no HTML; pass an HTML fixture".to_string(),
            ));
        }
        if needs_fetch && self.fetcher.is_none() {
            return Err(ConfigurationError::InvalidOption(
                "some items have no HTML and no fetcher is configured".to_string(),
            ));
        }

        match &options.force_adapter {
            Some(name) => self.dispatcher.clone().with_forced(name),
            None => Ok(self.dispatcher.clone()),
        }
    }

    pub async fn run(&self, items: &[IngestItem], options: &IngestOptions) -> Result<BatchResult> {
        let dispatcher = self.validate(items, options)?;

        let count = options.limit.map_or(items.len(), |limit| limit.min(items.len()));
        let items = &items[..count];
        self.logger.info(&format!(
            "📰 Ingesting {} item(s){}",
            count,
            if options.dry_run { " (dry run)" } else { "" }
        ));

        let mut state = RunState::default();
        let mut result = BatchResult {
            dry_run: options.dry_run,
            ..BatchResult::default()
        };

        for (index, item) in items.iter().enumerate() {
            if self.cancellation.is_cancelled() {
                self.logger
                    .warn(&format!("Cancelled after {} of {} item(s)", index, count));
                result.cancelled = true;
                break;
            }

            let logger = self.logger.for_item(index, count);
            let outcome = self
                .process(index, item, options, &dispatcher, &mut state, &logger)
                .await?;

            match &outcome {
                ItemOutcome::Failed { error } => logger.error(&format!("✗ {}: {}", item.url, error)),
                ItemOutcome::Skipped { reason } => logger.warn(&format!("Skipped {}: {}", item.url, reason)),
                ItemOutcome::Written { path, .. } => logger.info(&format!("✨ {}", path)),
            }

            result.items.push(ItemReport {
                index,
                url: item.url.clone(),
                outcome,
            });
        }

        self.logger.info(&format!("Done: {}", result.summary()));
        Ok(result)
    }

    /// Per-item errors become outcomes; only errors that would hit every
    /// item are returned.
    async fn process(
        &self,
        index: usize,
        item: &IngestItem,
        options: &IngestOptions,
        dispatcher: &AdapterDispatcher,
        state: &mut RunState,
        logger: &Logger,
    ) -> Result<ItemOutcome> {
        let (html, url) = match self.obtain_html(item, options, logger).await {
            Ok(page) => page,
            Err(e) => return classify(e),
        };

        if let Some(limit) = options.max_html_bytes {
            if html.len() > limit {
                return Ok(ItemOutcome::Skipped {
                    reason: SkipReason::TooLarge {
                        bytes: html.len(),
                        limit,
                    },
                });
            }
        }

        if options.explain {
            for trace in dispatcher.explain_with(&url, &html, &options.extract_context()) {
                let preview = match &trace.extraction {
                    Some(ExtractionPreview::Extracted { title, date }) => {
                        format!(" extracted {:?} ({})", title, date)
                    }
                    Some(ExtractionPreview::Failed(e)) => format!(" failed: {}", e),
                    None => String::new(),
                };
                logger.info(&format!(
                    "{} {:<10} priority={:<3} can_handle={}{}",
                    if trace.selected { "→" } else { " " },
                    trace.name,
                    trace.priority,
                    trace.can_handle,
                    preview
                ));
            }
        }

        let article = match dispatcher.dispatch_with(
            &url,
            &html,
            &options.extract_context(),
            &state.existing_slugs,
        ) {
            Ok(article) => article,
            Err(e) => return classify(e),
        };
        let adapter = dispatcher.select(&url)?.name().to_string();

        if options.dedupe {
            if let Some(first) = state.seen_urls.get(article.canonical_url()) {
                return Ok(ItemOutcome::Skipped {
                    reason: SkipReason::Duplicate {
                        index: *first,
                        canonical_url: article.canonical_url().to_string(),
                    },
                });
            }
        }

        let bytes = match self.renderer.render(&article) {
            Ok(bytes) => bytes,
            Err(e) => return classify(e.into()),
        };
        let name = self.renderer.filename(&article);

        let status = match self.store.read_document(&name).await {
            Ok(None) => WriteStatus::Created,
            Ok(Some(existing)) if existing == bytes => WriteStatus::Unchanged,
            Ok(Some(_)) => WriteStatus::Updated,
            Err(e) => return Ok(storage_failure(e)),
        };

        if options.dry_run {
            logger.debug(&format!("Dry run, not writing {}", name));
        } else if status != WriteStatus::Unchanged {
            logger.debug(&format!("💾 Writing {} ({} bytes)", name, bytes.len()));
            if let Err(e) = self.store.write_document(&name, &bytes).await {
                return Ok(storage_failure(e));
            }
        }

        state.existing_slugs.insert(article.slug().to_string());
        state
            .seen_urls
            .insert(article.canonical_url().to_string(), index);

        Ok(ItemOutcome::Written {
            path: self.store.location(&name),
            slug: article.slug().to_string(),
            status,
            adapter,
        })
    }

    /// The item's HTML and the URL it should be dispatched on.
    async fn obtain_html(
        &self,
        item: &IngestItem,
        options: &IngestOptions,
        logger: &Logger,
    ) -> Result<(String, String)> {
        if let Some(fixture) = &options.html_fixture {
            return Ok((fixture.clone(), item.url.clone()));
        }
        match &item.html {
            HtmlSource::Fixture(html) => Ok((html.clone(), item.url.clone())),
            HtmlSource::Live => {
                let fetcher = self.fetcher.as_ref().ok_or_else(|| {
                    ConfigurationError::InvalidOption("no fetcher is configured".to_string())
                })?;
                logger.info(&format!("🌐 Fetching {}", item.url));
                let page = fetcher.fetch(&item.url).await?;
                if page.final_url != item.url {
                    logger.debug(&format!("Redirected to {}", page.final_url));
                }
                Ok((page.html, page.final_url))
            }
        }
    }
}

fn classify(error: Error) -> Result<ItemOutcome> {
    if error.is_fatal() {
        return Err(error);
    }
    Ok(ItemOutcome::Failed {
        error: ItemError::from_error(&error),
    })
}

fn storage_failure(error: Error) -> ItemOutcome {
    ItemOutcome::Failed {
        error: ItemError::new(ItemErrorKind::Storage, error.to_string()),
    }
}
