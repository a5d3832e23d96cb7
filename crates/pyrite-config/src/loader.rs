//! Configuration Loader
//!
//! Loads and merges configuration from the global file, the nearest
//! `pyrite.toml` and `PYRITE_*` environment variables.

use crate::global::GlobalConfig;
use crate::project::{OutputFormat, ProjectConfig};
use crate::{validate_python_version, ConfigError, ConfigResult, DEFAULT_PYTHON_VERSION};
use std::env;
use std::path::{Path, PathBuf};

/// Name of the project configuration file
pub const PROJECT_CONFIG_FILE: &str = "pyrite.toml";

/// Configuration loader
///
/// Precedence, lowest first:
/// 1. Global config (~/.pyrite/config.toml)
/// 2. Project config (pyrite.toml)
/// 3. Environment variables (PYRITE_PYTHON_VERSION, PYRITE_OUTPUT_FORMAT)
pub struct ConfigLoader {
    /// Cached global config path
    global_config_path: Option<PathBuf>,
}

/// Merged configuration result
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub project: ProjectConfig,
    pub global: GlobalConfig,

    /// Directory where pyrite.toml was found
    pub project_root: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            global_config_path: None,
        }
    }

    /// Use an explicit global config file instead of ~/.pyrite/config.toml
    pub fn with_global_config_path(path: impl Into<PathBuf>) -> Self {
        Self {
            global_config_path: Some(path.into()),
        }
    }

    /// Load configuration starting from the given directory
    ///
    /// Walks up the directory tree looking for pyrite.toml.
    pub fn load_from_directory(&mut self, start_dir: &Path) -> ConfigResult<Config> {
        let (project_root, project_config) = self.find_project_config(start_dir)?;
        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root,
        })
    }

    /// Load configuration from a specific project config file
    pub fn load_from_file(&mut self, config_path: &Path) -> ConfigResult<Config> {
        let project_config = ProjectConfig::load_from_file(config_path)?;
        let global_config = self.load_global_config()?;
        let project_config = self.apply_env_overrides(project_config)?;

        Ok(Config {
            project: project_config,
            global: global_config,
            project_root: config_path.parent().map(|p| p.to_path_buf()),
        })
    }

    fn find_project_config(
        &self,
        start_dir: &Path,
    ) -> ConfigResult<(Option<PathBuf>, ProjectConfig)> {
        let mut current = start_dir.to_path_buf();

        loop {
            let config_path = current.join(PROJECT_CONFIG_FILE);

            if config_path.exists() {
                let project_config = ProjectConfig::load_from_file(&config_path)?;
                return Ok((Some(current), project_config));
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Ok((None, ProjectConfig::default())),
            }
        }
    }

    /// A missing global file (or home directory) is not an error; a broken one is.
    fn load_global_config(&mut self) -> ConfigResult<GlobalConfig> {
        let path = match &self.global_config_path {
            Some(path) => path.clone(),
            None => match GlobalConfig::global_config_path() {
                Ok(path) => {
                    self.global_config_path = Some(path.clone());
                    path
                }
                Err(ConfigError::HomeNotFound) => return Ok(GlobalConfig::default()),
                Err(e) => return Err(e),
            },
        };

        if !path.exists() {
            return Ok(GlobalConfig::default());
        }

        GlobalConfig::load_from_file(&path)
    }

    fn apply_env_overrides(&self, mut config: ProjectConfig) -> ConfigResult<ProjectConfig> {
        if let Ok(version) = env::var("PYRITE_PYTHON_VERSION") {
            let version: u32 = version.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "PYRITE_PYTHON_VERSION".to_string(),
                reason: format!("expected 2 or 3, got '{}'", version),
            })?;
            validate_python_version(version)?;
            config
                .checker
                .get_or_insert_with(Default::default)
                .python_version = Some(version);
        }

        if let Ok(format) = env::var("PYRITE_OUTPUT_FORMAT") {
            let format: OutputFormat = format.parse()?;
            config.output.get_or_insert_with(Default::default).format = Some(format);
        }

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Effective python version (project > global > 3)
    pub fn python_version(&self) -> u32 {
        self.project
            .python_version()
            .or_else(|| self.global.default_python_version())
            .unwrap_or(DEFAULT_PYTHON_VERSION)
    }

    /// Effective output format (project > global > human)
    pub fn output_format(&self) -> OutputFormat {
        self.project
            .output_format()
            .or_else(|| self.global.default_output_format())
            .unwrap_or_default()
    }

    pub fn project_root(&self) -> Option<&Path> {
        self.project_root.as_deref()
    }

    /// Whether a pyrite.toml was found
    pub fn is_project(&self) -> bool {
        self.project_root.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_any_file() {
        let config = Config::default();
        assert_eq!(config.python_version(), 3);
        assert_eq!(config.output_format(), OutputFormat::Human);
        assert!(!config.is_project());
    }
}
