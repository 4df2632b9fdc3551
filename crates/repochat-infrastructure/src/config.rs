//! Application configuration loaded from `config.toml`.
//!
//! Every key is optional; a missing file or missing keys fall back to the
//! defaults below.
//!
//! ```toml
//! log_level = "info"
//!
//! [gateway]
//! openai_model = "gpt-3.5-turbo"
//! temperature = 0.7
//! max_tokens = 2000
//!
//! [storage]
//! data_dir = "/var/lib/repochat"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use repochat_core::{ChatError, Result};

pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            gateway: GatewayConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// Provider endpoints and completion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub openai_endpoint: String,
    pub openai_model: String,
    pub anthropic_endpoint: String,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            openai_endpoint: DEFAULT_OPENAI_ENDPOINT.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            anthropic_endpoint: DEFAULT_ANTHROPIC_ENDPOINT.to_string(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Loads the configuration at `path`.
    ///
    /// A missing or blank file yields the defaults; a malformed file is a
    /// [`ChatError::Config`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        toml::from_str(&content)
            .map_err(|e| ChatError::config(format!("{}: {}", path.display(), e)))
    }
}
