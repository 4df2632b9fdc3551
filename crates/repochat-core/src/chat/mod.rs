//! Chats and their append-only message logs.

pub mod model;

pub use model::{Chat, Message, MessageRole, DEFAULT_CHAT_NAME};
