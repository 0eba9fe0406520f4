//! `artifactor.yml` handling: schema, discovery and command line overrides.
//!
//! Precedence is command line, then the config file, then built-in defaults.

pub mod loader;
pub mod schema;

pub use loader::{discover_config_file, load_config, load_config_from_str, LoadedConfig, CONFIG_FILE_NAMES};
pub use schema::{
    ArtifactorConfig, CliOverrides, DateConfig, DedupeConfig, DedupeStrategy, IngestConfig,
    InputConfig, OutputConfig,
};
