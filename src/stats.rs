//! Process-wide usage counters
//!
//! Message handlers for different chats run concurrently, so the
//! counters are plain atomics. The counter object is constructed once in
//! `main` and injected into handlers through dispatcher dependencies.

use std::sync::atomic::{AtomicU64, Ordering};

/// Messages-handled and media-delivered counters.
///
/// Lifetime is the process: nothing is persisted across restarts.
#[derive(Debug, Default)]
pub struct Stats {
    messages_handled: AtomicU64,
    media_delivered: AtomicU64,
}

impl Stats {
    /// Create a zeroed counter pair
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one handled incoming message
    pub fn inc_messages(&self) {
        self.messages_handled.fetch_add(1, Ordering::Relaxed);
    }

    /// Record `n` delivered media items
    pub fn add_media(&self, n: u64) {
        self.media_delivered.fetch_add(n, Ordering::Relaxed);
    }

    /// Zero both counters.
    ///
    /// A reset racing a concurrent increment may win or lose that race;
    /// either outcome is acceptable.
    pub fn reset(&self) {
        self.messages_handled.store(0, Ordering::Relaxed);
        self.media_delivered.store(0, Ordering::Relaxed);
    }

    /// Snapshot of `(messages_handled, media_delivered)`
    #[must_use]
    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.messages_handled.load(Ordering::Relaxed),
            self.media_delivered.load(Ordering::Relaxed),
        )
    }
}
