//! `tiller.toml` project configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File looked up in the working directory when no config is given.
pub const CONFIG_FILE: &str = "tiller.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Project settings. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Module whose output is the program's entry file.
    pub entry_module: String,
    /// Basename of the entry output.
    pub entry_output: String,
    /// Extension of every output file.
    pub extension: String,
    /// Where outputs go; next to each input when unset.
    pub out_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entry_module: "Program".to_string(),
            entry_output: "main".to_string(),
            extension: "py".to_string(),
            out_dir: None,
        }
    }
}

impl Config {
    /// Load a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `tiller.toml` in `dir` if there is one, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn is_entry(&self, module_name: &str) -> bool {
        module_name == self.entry_module
    }

    /// Output file name for a module.
    pub fn output_name(&self, module_name: &str) -> String {
        let stem = if self.is_entry(module_name) {
            self.entry_output.clone()
        } else {
            rhizome_tiller_core::naming::to_target_name(module_name)
        };
        format!("{}.{}", stem, self.extension)
    }
}
