//! Chat gateway port.
//!
//! The application hands a fully assembled conversation to a gateway and gets
//! the assistant's reply text back. Implementations live in `repochat-interaction`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chat::MessageRole;
use crate::error::Result;
use crate::settings::AiProvider;

/// One turn of the outbound conversation: only role and content travel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Everything a gateway needs for a single completion call.
#[derive(Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub provider: AiProvider,
    pub api_key: String,
    pub messages: Vec<ChatTurn>,
}

impl std::fmt::Debug for CompletionRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionRequest")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("messages", &self.messages.len())
            .finish()
    }
}

/// Performs the outbound call to the LLM provider.
///
/// A single request, no retries, no streaming. Provider failures are mapped to
/// [`ChatError::ContextTooLarge`](crate::ChatError::ContextTooLarge) or
/// [`ChatError::Provider`](crate::ChatError::Provider).
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Returns the first completion's message content verbatim.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
