use std::fmt;

use af_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Created,
    Updated,
    /// Stored bytes already match the render; nothing was written.
    Unchanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemErrorKind {
    Fetch,
    Extraction,
    Render,
    Storage,
}

impl fmt::Display for ItemErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemErrorKind::Fetch => "fetch",
            ItemErrorKind::Extraction => "extraction",
            ItemErrorKind::Render => "render",
            ItemErrorKind::Storage => "storage",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemError {
    pub kind: ItemErrorKind,
    /// The adapter that failed, for extraction errors.
    pub adapter: Option<String>,
    pub message: String,
}

impl ItemError {
    pub fn new(kind: ItemErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            adapter: None,
            message: message.into(),
        }
    }

    /// Classifies a per-item error.
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::Fetch(e) => Self::new(ItemErrorKind::Fetch, e.to_string()),
            Error::Extraction { adapter, source } => Self {
                kind: ItemErrorKind::Extraction,
                adapter: Some(adapter.clone()),
                message: source.to_string(),
            },
            Error::NoAdapter(_) | Error::InvalidArticle(_) => {
                Self::new(ItemErrorKind::Extraction, error.to_string())
            }
            Error::Render(e) => Self::new(ItemErrorKind::Render, e.to_string()),
            _ => Self::new(ItemErrorKind::Storage, error.to_string()),
        }
    }
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.adapter {
            Some(adapter) => write!(f, "{} error ({} adapter): {}", self.kind, adapter, self.message),
            None => write!(f, "{} error: {}", self.kind, self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Same canonical URL as the item at `index` earlier in the batch
    Duplicate { index: usize, canonical_url: String },
    TooLarge { bytes: usize, limit: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Duplicate { index, canonical_url } => {
                write!(f, "duplicate of item {} ({})", index + 1, canonical_url)
            }
            SkipReason::TooLarge { bytes, limit } => {
                write!(f, "HTML is {} bytes, above the {} byte limit", bytes, limit)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Written {
        path: String,
        slug: String,
        status: WriteStatus,
        adapter: String,
    },
    Skipped {
        reason: SkipReason,
    },
    Failed {
        error: ItemError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub index: usize,
    pub url: String,
    pub outcome: ItemOutcome,
}

impl ItemReport {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Failed { .. })
    }

    /// One line for the batch report, e.g. `✓ CREATED site/_posts/x.html`.
    pub fn status_line(&self) -> String {
        match &self.outcome {
            ItemOutcome::Written { path, status, .. } => match status {
                WriteStatus::Created => format!("✓ CREATED {}", path),
                WriteStatus::Updated => format!("↻ UPDATED {}", path),
                WriteStatus::Unchanged => format!("= UNCHANGED {}", path),
            },
            ItemOutcome::Skipped { reason } => format!("- SKIPPED {} ({})", self.url, reason),
            ItemOutcome::Failed { error } => format!("✗ FAILED {} ({})", self.url, error),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.created + self.updated + self.unchanged + self.skipped + self.failed
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} unchanged, {} skipped, {} failed",
            self.created, self.updated, self.unchanged, self.skipped, self.failed
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// One report per processed item, in input order.
    pub items: Vec<ItemReport>,
    /// The run was stopped before every item was processed.
    pub cancelled: bool,
    pub dry_run: bool,
}

impl BatchResult {
    pub fn is_success(&self) -> bool {
        !self.cancelled && !self.items.iter().any(ItemReport::is_failed)
    }

    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for item in &self.items {
            match &item.outcome {
                ItemOutcome::Written { status, .. } => match status {
                    WriteStatus::Created => summary.created += 1,
                    WriteStatus::Updated => summary.updated += 1,
                    WriteStatus::Unchanged => summary.unchanged += 1,
                },
                ItemOutcome::Skipped { .. } => summary.skipped += 1,
                ItemOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemReport> {
        self.items.iter().filter(|i| i.is_failed())
    }
}
