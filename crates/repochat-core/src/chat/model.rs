use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::id::RecordId;

/// Name given to every chat on creation.
pub const DEFAULT_CHAT_NAME: &str = "New Chat";

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A conversation. Never renamed or deleted once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: RecordId,
    pub name: String,
    /// Creation time (ISO 8601)
    pub timestamp: String,
}

/// A single message in a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: RecordId,
    pub role: MessageRole,
    pub content: String,
    /// Creation time (ISO 8601)
    pub timestamp: String,
    /// Repository ids selected when the message was sent.
    #[serde(default)]
    pub repositories: Vec<RecordId>,
}

impl Message {
    /// The recorded repository ids as an order-independent set.
    pub fn repository_set(&self) -> BTreeSet<RecordId> {
        self.repositories.iter().copied().collect()
    }
}
