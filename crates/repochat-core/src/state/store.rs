//! Persistent store port.

use super::model::{AppState, Slot};
use crate::error::Result;

/// A process-wide key/value store holding one JSON document per [`Slot`].
///
/// Implementations must treat slots independently: writing one slot never
/// touches another.
pub trait StateStore: Send + Sync {
    /// Returns the stored JSON text of a slot, or `None` if it was never written.
    fn get(&self, slot: Slot) -> Result<Option<String>>;

    /// Replaces the stored JSON text of a slot.
    fn set(&self, slot: Slot, json: &str) -> Result<()>;
}

/// Reads every slot once. Absent slots keep their default value.
pub fn load_state(store: &dyn StateStore) -> Result<AppState> {
    let mut state = AppState::default();
    for slot in Slot::ALL {
        if let Some(json) = store.get(slot)? {
            state.apply_slot_json(slot, &json)?;
            tracing::debug!(slot = %slot, bytes = json.len(), "Loaded state slot");
        }
    }
    Ok(state)
}

/// Re-serializes the given slots of `state` into `store`.
pub fn persist_slots(store: &dyn StateStore, state: &AppState, slots: &[Slot]) -> Result<()> {
    for &slot in slots {
        let json = state.slot_json(slot)?;
        store.set(slot, &json)?;
    }
    Ok(())
}
