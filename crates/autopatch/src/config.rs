//! Configuration file handling

use anyhow::{Context, Result};
use autopatch_core::{DiffEngine, DEFAULT_MAX_CELLS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub diff: DiffConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// [diff] section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffConfig {
    /// LCS table ceiling; 0 disables it
    #[serde(default = "default_max_cells")]
    pub max_cells: usize,
}

/// How a diff is laid out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Unified,
    Split,
}

/// [display] section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub view: ViewMode,
    #[serde(default = "default_true")]
    pub line_numbers: bool,
    #[serde(default = "default_tab_width")]
    pub tab_width: u8,
}

/// [analysis] section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key (`API_KEY` is tried after it)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_cells() -> usize {
    DEFAULT_MAX_CELLS
}

fn default_true() -> bool {
    true
}

fn default_tab_width() -> u8 {
    4
}

fn default_model() -> String {
    "gemini-3-pro-preview".into()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_cells: default_max_cells(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            view: ViewMode::default(),
            line_numbers: true,
            tab_width: default_tab_width(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DiffConfig {
    pub fn engine(&self) -> DiffEngine {
        let limit = (self.max_cells > 0).then_some(self.max_cells);
        DiffEngine::new().with_max_cells(limit)
    }
}

/// Global config location (`~/.config/autopatch/config.toml` on Linux)
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("autopatch").join("config.toml"))
}

/// Load config from `path`, or from the default location.
///
/// A missing default file yields built-in defaults; an explicit path must exist.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_path() {
            Some(p) => (p, false),
            None => return Ok(Config::default()),
        },
    };

    if !required && !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    parse(&content).with_context(|| format!("Invalid config {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}
