//! Record identifier generation.
//!
//! Ids keep the shape of a Unix millisecond timestamp, but two ids handed out
//! by the same generator never collide: when the clock has not advanced past
//! the previous id, the next id is `previous + 1`. The sequence saturates at
//! `u64::MAX`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier of repositories, files, chats and messages.
pub type RecordId = u64;

/// Monotonic, clock-seeded id source.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator whose ids are all strictly greater than `last_issued`.
    ///
    /// Used on startup so that ids stay unique across restarts even if the
    /// wall clock moved backwards in between.
    pub fn resume_after(last_issued: RecordId) -> Self {
        Self {
            last: AtomicU64::new(last_issued),
        }
    }

    /// Returns the next id.
    pub fn next_id(&self) -> RecordId {
        let now = now_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last.saturating_add(1)))
            })
            .unwrap_or_else(|last| last);
        now.max(previous.saturating_add(1))
    }
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
