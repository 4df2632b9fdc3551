//! In-process [`StateStore`], used for ephemeral sessions and tests.

use std::collections::HashMap;
use std::sync::Mutex;

use repochat_core::state::{Slot, StateStore};
use repochat_core::{ChatError, Result};

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    slots: Mutex<HashMap<Slot, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots written so far.
    pub fn len(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, slot: Slot) -> Result<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| ChatError::internal(format!("state store lock poisoned: {e}")))?;
        Ok(slots.get(&slot).cloned())
    }

    fn set(&self, slot: Slot, json: &str) -> Result<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| ChatError::internal(format!("state store lock poisoned: {e}")))?;
        slots.insert(slot, json.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites() {
        let store = MemoryStateStore::new();
        assert!(store.is_empty());

        store.set(Slot::Settings, "{}").unwrap();
        store
            .set(Slot::Settings, r#"{"aiProvider":"OpenAI","apiKey":""}"#)
            .unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get(Slot::Settings).unwrap().unwrap().contains("OpenAI"));
        assert!(store.get(Slot::Chats).unwrap().is_none());
    }
}
