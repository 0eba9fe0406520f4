use std::path::{Path, PathBuf};

use af_core::{ConfigurationError, DATE_FORMAT};
use af_sources::AdapterDispatcher;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_USER_AGENT: &str = "Artifactor/0.1 (+https://github.com/K-reel/artifactor)";
pub const DEFAULT_MAX_HTML_BYTES: usize = 5 * 1024 * 1024;
const DEFAULT_SITE_DIR: &str = "site";
const POSTS_DIR: &str = "_posts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactorConfig {
    pub version: u32,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub ingest: IngestConfig,
}

impl Default for ArtifactorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            input: InputConfig::default(),
            output: OutputConfig::default(),
            ingest: IngestConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub allow_network: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            allow_network: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub site_dir: PathBuf,
    /// Defaults to `<site_dir>/_posts`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            site_dir: PathBuf::from(DEFAULT_SITE_DIR),
            posts_dir: None,
        }
    }
}

impl OutputConfig {
    pub fn posts_dir(&self) -> PathBuf {
        self.posts_dir
            .clone()
            .unwrap_or_else(|| self.site_dir.join(POSTS_DIR))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    pub force_adapter: Option<String>,
    pub max_html_bytes: usize,
    pub date: DateConfig,
    pub dedupe: DedupeConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            force_adapter: None,
            max_html_bytes: DEFAULT_MAX_HTML_BYTES,
            date: DateConfig::default(),
            dedupe: DedupeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DateConfig {
    /// When true a page without a date always fails, no fallback allowed.
    pub require: bool,
    /// `YYYY-MM-DD` used for pages without a date.
    pub fallback_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DedupeConfig {
    pub strategy: DedupeStrategy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupeStrategy {
    /// Skip items whose canonical URL was already seen in the batch
    #[default]
    CanonicalUrl,
    None,
}

impl ArtifactorConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.version != CONFIG_VERSION {
            return Err(invalid(format!(
                "unsupported version {} (expected {})",
                self.version, CONFIG_VERSION
            )));
        }
        if self.input.timeout_secs == 0 {
            return Err(invalid("input.timeout_secs must be greater than 0"));
        }
        if self.input.user_agent.trim().is_empty() {
            return Err(invalid("input.user_agent must not be empty"));
        }
        if self.ingest.max_html_bytes == 0 {
            return Err(invalid("ingest.max_html_bytes must be greater than 0"));
        }

        if let Some(raw) = &self.ingest.date.fallback_date {
            parse_fallback_date(raw)?;
            if self.ingest.date.require {
                return Err(invalid(
                    "ingest.date.require is true, so ingest.date.fallback_date cannot be set",
                ));
            }
        }

        if let Some(name) = &self.ingest.force_adapter {
            let available = AdapterDispatcher::builtin().available_names();
            if !available.iter().any(|a| a == name) {
                return Err(ConfigurationError::UnknownAdapter {
                    name: name.clone(),
                    available,
                });
            }
        }

        Ok(())
    }

    pub fn fallback_date(&self) -> Option<NaiveDate> {
        if self.ingest.date.require {
            return None;
        }
        self.ingest
            .date
            .fallback_date
            .as_deref()
            .and_then(|raw| parse_fallback_date(raw).ok())
    }

    pub fn posts_dir(&self) -> PathBuf {
        self.output.posts_dir()
    }

    pub fn dedupe(&self) -> bool {
        self.ingest.dedupe.strategy == DedupeStrategy::CanonicalUrl
    }

    /// Applies command line values on top of this config and revalidates.
    pub fn merge(&self, overrides: &CliOverrides) -> Result<Self, ConfigurationError> {
        let mut merged = self.clone();

        if let Some(site_dir) = &overrides.site_dir {
            merged.output.site_dir = site_dir.clone();
            merged.output.posts_dir = None;
        }
        if let Some(posts_dir) = &overrides.posts_dir {
            merged.output.posts_dir = Some(posts_dir.clone());
        }
        if let Some(timeout) = overrides.timeout_secs {
            merged.input.timeout_secs = timeout;
        }
        if let Some(user_agent) = &overrides.user_agent {
            merged.input.user_agent = user_agent.clone();
        }
        if let Some(adapter) = &overrides.force_adapter {
            merged.ingest.force_adapter = Some(adapter.clone());
        }
        if let Some(date) = &overrides.fallback_date {
            merged.ingest.date.fallback_date = Some(date.clone());
        }
        if overrides.require_date {
            merged.ingest.date.require = true;
        }
        if overrides.offline {
            merged.input.allow_network = false;
        }

        merged.validate()?;
        Ok(merged)
    }
}

/// Values given on the command line. `None` leaves the config value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub site_dir: Option<PathBuf>,
    pub posts_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub offline: bool,
    pub force_adapter: Option<String>,
    pub fallback_date: Option<String>,
    pub require_date: bool,
}

impl CliOverrides {
    pub fn with_site_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.site_dir = Some(dir.as_ref().to_path_buf());
        self
    }
}

fn parse_fallback_date(raw: &str) -> Result<NaiveDate, ConfigurationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        invalid(format!(
            "ingest.date.fallback_date `{}` is not a YYYY-MM-DD date",
            raw
        ))
    })
}

fn invalid(message: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidConfig(message.into())
}
