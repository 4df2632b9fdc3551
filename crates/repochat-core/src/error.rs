//! Error types for repochat.

use thiserror::Error;

/// Shown when a send is attempted without any repository selected.
pub const NO_REPOSITORY_SELECTED: &str =
    "Please select at least one repository as context before sending a message";

/// Shown when a send is attempted with a blank message.
pub const EMPTY_MESSAGE: &str = "Message content cannot be empty";

/// Shown when no API key is available for the configured provider.
pub const MISSING_API_KEY: &str = "Please set your API key in settings first";

/// A shared error type for every repochat crate.
///
/// The first four variants form the user-facing taxonomy of a send:
/// they are all transient, the application stays usable and the user may retry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    /// Rejected input (empty message, no repository selected, missing API key).
    /// Raised before any state mutation.
    #[error("{0}")]
    Validation(String),

    /// The repository selection differs from the set pinned by the chat's first message.
    #[error(
        "Cannot change repository context once a chat has started. Please start a new chat to use different repositories."
    )]
    ContextLocked,

    /// The provider rejected the payload as exceeding its context window.
    #[error(
        "The selected repositories contain too much content. Please select fewer repositories or files with less content."
    )]
    ContextTooLarge,

    /// Any other provider failure, carrying the provider's own message when present.
    #[error("{0}")]
    Provider(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_context_locked(&self) -> bool {
        matches!(self, Self::ContextLocked)
    }

    pub fn is_context_too_large(&self) -> bool {
        matches!(self, Self::ContextTooLarge)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ChatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ChatError>`.
pub type Result<T> = std::result::Result<T, ChatError>;
