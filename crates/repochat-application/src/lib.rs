//! Application layer for repochat.
//!
//! [`ChatController`] owns the in-memory state, applies the pure transitions
//! from `repochat-core`, persists touched slots and drives the chat gateway.

pub mod chat_controller;

pub use chat_controller::ChatController;
