//! Pyrite configuration
//!
//! Configuration is loaded and merged in the following order (later overrides earlier):
//! 1. Global config (~/.pyrite/config.toml)
//! 2. Project config (./pyrite.toml, searched upwards from the start directory)
//! 3. Environment variables (PYRITE_*)
//!
//! # Example
//!
//! ```no_run
//! use pyrite_config::ConfigLoader;
//! use std::path::Path;
//!
//! let mut loader = ConfigLoader::new();
//! let config = loader.load_from_directory(Path::new(".")).unwrap();
//! assert!(config.python_version() >= 2);
//! ```

pub mod global;
pub mod loader;
pub mod project;

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax in {file}: {error}")]
    TomlParseError {
        file: PathBuf,
        error: toml::de::Error,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Unsupported python version: {0}")]
    UnsupportedVersion(u32),

    #[error("Home directory not found")]
    HomeNotFound,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

pub use global::GlobalConfig;
pub use loader::{Config, ConfigLoader};
pub use project::{CheckerConfig, OutputConfig, OutputFormat, ProjectConfig};

/// Python major versions the checker understands
pub const SUPPORTED_PYTHON_VERSIONS: [u32; 2] = [2, 3];

/// Python major version used when nothing is configured
pub const DEFAULT_PYTHON_VERSION: u32 = 3;

pub(crate) fn validate_python_version(version: u32) -> ConfigResult<()> {
    if SUPPORTED_PYTHON_VERSIONS.contains(&version) {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedVersion(version))
    }
}
