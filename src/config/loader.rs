//! Locating and reading the harness config file.

use std::path::{Path, PathBuf};

use super::HarnessConfig;

const LOCAL_CONFIG: &str = ".gc-harness.toml";

/// Finds the harness config: `./.gc-harness.toml` first, then
/// `<config dir>/gc-harness/config.toml`. The first file that exists wins;
/// with none, the builtin scenarios run under default settings.
#[derive(Debug)]
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        let user = dirs::config_dir().map(|dir| dir.join("gc-harness").join("config.toml"));
        Self {
            search_paths: std::iter::once(PathBuf::from(LOCAL_CONFIG))
                .chain(user)
                .collect(),
        }
    }

    /// Only consult `path` (the `--config` flag).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            search_paths: vec![path],
        }
    }

    /// Parse and validate the first config file found.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read, is not valid TOML
    /// for [`HarnessConfig`], or fails [`HarnessConfig::validate`].
    pub fn load(&self) -> Result<HarnessConfig, ConfigError> {
        match self.find_config_file() {
            Some(path) => {
                tracing::debug!(path = %path.display(), "Loading harness config");
                Self::load_from_path(&path)
            }
            None => {
                tracing::debug!(searched = ?self.search_paths, "No harness config, using builtin scenarios");
                Ok(HarnessConfig::default())
            }
        }
    }

    fn load_from_path(path: &Path) -> Result<HarnessConfig, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: HarnessConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// The file [`load`](Self::load) would read, if any.
    #[must_use]
    pub fn find_config_file(&self) -> Option<PathBuf> {
        self.search_paths.iter().find(|p| p.exists()).cloned()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a config could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Unknown scenario '{0}'")]
    UnknownScenario(String),
}
