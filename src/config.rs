//! Application configuration
//!
//! Settings come from a TOML file, either the one named with `--config` or
//! `abyssal-stats.toml` in the working directory. Both keys are optional:
//!
//! ```toml
//! data_dir = "/home/pilot/.local/share/abyssal-stats"
//! prices_file = "/home/pilot/prices.json"
//! ```
//!
//! `ABYSSAL_DATA_DIR` overrides `data_dir` from the file.

use crate::error::{AbyssalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "abyssal-stats.toml";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "ABYSSAL_DATA_DIR";

/// Price file name used when `prices_file` is not set
pub const DEFAULT_PRICES_FILE: &str = "prices.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the run record files
    pub data_dir: PathBuf,
    /// Price file; `prices.json` inside `data_dir` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            prices_file: None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("abyssal-stats"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

impl AppConfig {
    /// Load configuration and apply the environment override
    ///
    /// An explicit `path` must exist. Without one, a missing
    /// `abyssal-stats.toml` falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `AbyssalError::Config` if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };

        Ok(config.with_env_override(std::env::var(DATA_DIR_ENV).ok()))
    }

    /// Read and parse one TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AbyssalError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
            .map_err(|e| AbyssalError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AbyssalError::Config(e.to_string()))
    }

    /// Replace `data_dir` with a non-empty override value
    pub fn with_env_override(self, value: Option<String>) -> Self {
        match value.filter(|v| !v.trim().is_empty()) {
            Some(dir) => {
                debug!("Data directory overridden by {}: {}", DATA_DIR_ENV, dir);
                self.with_data_dir(PathBuf::from(dir))
            }
            None => self,
        }
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = data_dir;
        self
    }

    /// Resolved price file path
    pub fn prices_path(&self) -> PathBuf {
        self.prices_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_PRICES_FILE))
    }
}
