//! Directory-backed [`StateStore`]: one `<slot>.json` file per slot.

use std::path::{Path, PathBuf};

use repochat_core::Result;
use repochat_core::state::{Slot, StateStore};

use super::atomic_json::AtomicJsonFile;
use crate::paths::RepochatPaths;

pub struct JsonDirStateStore {
    dir: PathBuf,
}

impl JsonDirStateStore {
    /// Store rooted at the platform data directory.
    pub fn new() -> Result<Self> {
        Ok(Self::with_dir(RepochatPaths::data_dir()?))
    }

    /// Store rooted at a custom directory (used by `--data-dir` and tests).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_file(&self, slot: Slot) -> AtomicJsonFile {
        AtomicJsonFile::new(self.dir.join(format!("{}.json", slot.key())))
    }
}

impl StateStore for JsonDirStateStore {
    fn get(&self, slot: Slot) -> Result<Option<String>> {
        Ok(self.slot_file(slot).load()?)
    }

    fn set(&self, slot: Slot, json: &str) -> Result<()> {
        self.slot_file(slot).save(json)?;
        tracing::debug!(slot = %slot, bytes = json.len(), "Persisted state slot");
        Ok(())
    }
}
