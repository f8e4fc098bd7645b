//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Every field has a default, so a missing file yields a working offline setup.

use serde::Deserialize;
use std::path::Path;

use anyhow::{Context, Result};

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

/// Env var that overrides the configured model name.
pub const MODEL_ENV: &str = "AI_MODEL";

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub system: SystemConfig,
}

/// Settings for the plan generator (offline stub or remote service).
#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    #[serde(default = "default_offline")]
    pub offline: bool,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: Option<String>, // e.g. "OPENAI_API_KEY"
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// HTTP timeout in seconds for a single request.
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            offline: default_offline(),
            provider: default_provider(),
            model: default_model(),
            endpoint: None,
            api_key: None,
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout: None,
        }
    }
}

/// Host-level settings.
#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    /// Project opened at startup, if any.
    #[serde(default)]
    pub project_dir: Option<String>,
    #[serde(default = "default_preview_lines")]
    pub preview_lines: usize,
    /// Where `session.log` is written.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Upper bound in seconds on a whole fetch. Unset means no limit.
    #[serde(default)]
    pub fetch_timeout: Option<u64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            project_dir: None,
            preview_lines: default_preview_lines(),
            data_dir: default_data_dir(),
            fetch_timeout: None,
        }
    }
}

fn default_offline() -> bool {
    true
}
fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_api_key_env() -> Option<String> {
    Some("OPENAI_API_KEY".to_string())
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_preview_lines() -> usize {
    40
}
fn default_data_dir() -> String {
    "data".to_string()
}

impl AppConfig {
    /// Load from `path`. A missing file gives defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_yaml(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };

        if let Ok(model) = std::env::var(MODEL_ENV)
            && !model.trim().is_empty()
        {
            config.generator.model = model;
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
