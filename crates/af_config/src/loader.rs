use std::path::{Path, PathBuf};

use af_core::ConfigurationError;
use tracing::{debug, info};

use crate::schema::ArtifactorConfig;

/// Looked up in this order in every directory.
pub const CONFIG_FILE_NAMES: &[&str] = &["artifactor.yml", "artifactor.yaml"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: ArtifactorConfig,
    /// `None` when no file was found and defaults are in use.
    pub path: Option<PathBuf>,
}

/// Finds the nearest config file in `start` or any of its parents.
pub fn discover_config_file(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// Parses and validates a config document. An empty document means defaults.
pub fn load_config_from_str(text: &str) -> Result<ArtifactorConfig, ConfigurationError> {
    let config = if text.trim().is_empty() {
        ArtifactorConfig::default()
    } else {
        serde_yaml::from_str::<Option<ArtifactorConfig>>(text)
            .map_err(|e| ConfigurationError::InvalidConfig(e.to_string()))?
            .unwrap_or_default()
    };
    config.validate()?;
    Ok(config)
}

/// Loads `explicit` if given, otherwise the file discovered from `cwd`,
/// otherwise the defaults. An explicit path that cannot be read is an error.
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> Result<LoadedConfig, ConfigurationError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config_file(cwd),
    };

    let Some(path) = path else {
        debug!("No config file found from {}, using defaults", cwd.display());
        return Ok(LoadedConfig {
            config: ArtifactorConfig::default(),
            path: None,
        });
    };

    let text = std::fs::read_to_string(&path).map_err(|e| {
        ConfigurationError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
    })?;
    let config = load_config_from_str(&text).map_err(|e| match e {
        ConfigurationError::InvalidConfig(message) => {
            ConfigurationError::InvalidConfig(format!("{}: {}", path.display(), message))
        }
        other => other,
    })?;

    info!("Loaded config from {}", path.display());
    Ok(LoadedConfig {
        config,
        path: Some(path),
    })
}
