//! Persistent store implementations.

mod atomic_json;
mod json_dir_store;
mod memory_store;

pub use atomic_json::{AtomicJsonError, AtomicJsonFile};
pub use json_dir_store::JsonDirStateStore;
pub use memory_store::MemoryStateStore;
