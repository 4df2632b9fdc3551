//! User settings: provider choice and API credential.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ChatError, Result};

/// Prefix every well-formed API key starts with.
pub const API_KEY_PREFIX: &str = "sk-";
/// Minimum length of a well-formed API key.
pub const API_KEY_MIN_LEN: usize = 20;

/// The hosted LLM provider chats are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiProvider {
    #[default]
    OpenAI,
    Anthropic,
}

impl AiProvider {
    /// Environment variable consulted when no key is stored in settings.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => write!(f, "OpenAI"),
            Self::Anthropic => write!(f, "Anthropic"),
        }
    }
}

impl FromStr for AiProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Singleton settings record, persisted in the `settings` slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub ai_provider: AiProvider,
    #[serde(default)]
    pub api_key: String,
}

/// Partial update merged into [`Settings`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub ai_provider: Option<AiProvider>,
    pub api_key: Option<String>,
}

impl Settings {
    /// Returns a copy with every field present in `patch` overwritten.
    pub fn merged(&self, patch: SettingsPatch) -> Self {
        Self {
            ai_provider: patch.ai_provider.unwrap_or(self.ai_provider),
            api_key: patch.api_key.unwrap_or_else(|| self.api_key.clone()),
        }
    }
}

/// Advisory format check for API keys.
///
/// Only gates the local save confirmation; sends are never blocked by it.
pub fn validate_api_key(key: &str) -> Result<()> {
    if !key.starts_with(API_KEY_PREFIX) || key.chars().count() < API_KEY_MIN_LEN {
        return Err(ChatError::validation(format!(
            "Invalid API key format. It should start with \"{API_KEY_PREFIX}\" and be at least {API_KEY_MIN_LEN} characters long."
        )));
    }
    Ok(())
}
