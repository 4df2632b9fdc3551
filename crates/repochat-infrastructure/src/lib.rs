pub mod config;
pub mod ingest;
pub mod paths;
pub mod storage;

pub use crate::config::{AppConfig, GatewayConfig};
pub use crate::ingest::{Upload, ingest, ingest_all};
pub use crate::paths::RepochatPaths;
pub use crate::storage::{JsonDirStateStore, MemoryStateStore};
