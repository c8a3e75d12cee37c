//! Optional TOML configuration: initial pane widths and the catalog path.
//!
//! Everything has a compiled-in default; a missing or malformed file only
//! produces a log line.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ShellError;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Path to the app catalog JSON file.
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Initial explorer sidebar width in columns.
    #[serde(default = "default_explorer_width")]
    pub explorer_width: u16,
    /// Initial chat-agent panel width in columns.
    #[serde(default = "default_agent_width")]
    pub agent_width: u16,
}

fn default_explorer_width() -> u16 {
    24
}

fn default_agent_width() -> u16 {
    36
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            explorer_width: default_explorer_width(),
            agent_width: default_agent_width(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ShellError> {
        let contents = fs::read_to_string(path).map_err(|source| ShellError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ShellError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `path` when given; any failure degrades to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "using default configuration");
                Self::default()
            }
        }
    }
}
