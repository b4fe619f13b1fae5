//! User-facing notification surface.
//!
//! The cart converts every failed operation into exactly one human-readable
//! message on this channel - the headless counterpart of a toast popup. A UI
//! shell supplies its own implementation; headless embedders use
//! [`TracingNotifier`].

use std::sync::{Mutex, PoisonError};

/// Sink for user-visible failure messages.
pub trait Notifier: Send + Sync {
    /// Surface an error message to the user.
    fn error(&self, message: &str);
}

/// Notifier that routes messages to the `tracing` WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(notification = %message, "user notification");
    }
}

/// Notifier that records messages in order.
///
/// Intended for tests asserting on the exact notifications an operation
/// produced.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn error(&self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
