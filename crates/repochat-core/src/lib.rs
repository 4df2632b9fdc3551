//! Domain model and core logic of repochat.
//!
//! Everything in this crate is free of I/O: storage and the provider call are
//! reached through the [`state::StateStore`] and [`gateway::ChatGateway`] ports.

pub mod chat;
pub mod context;
pub mod error;
pub mod gateway;
pub mod id;
pub mod mime;
pub mod repo;
pub mod settings;
pub mod state;

pub use error::{ChatError, Result};
pub use id::{IdGenerator, RecordId};
pub use mime::MimeKind;
