//! Application state, its persisted slots and the pure transitions over it.

pub mod model;
pub mod store;
pub mod transition;

pub use model::{AppState, Slot};
pub use store::{StateStore, load_state, persist_slots};
pub use transition::Transition;
