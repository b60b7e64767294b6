//! # Shutdown Trigger
//!
//! The internal half of the shutdown race: a one-shot flag that any task or
//! thread can resolve through a [`StopHandle`]. Resolving it again, from the
//! same caller or concurrently from many, is a no-op.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// A single-resolution "stop now" signal.
#[derive(Debug, Clone)]
pub struct ShutdownTrigger {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownTrigger {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Resolves the trigger. Returns `true` only for the call that did it.
    pub fn trigger(&self) -> bool {
        let first = self.tx.send_if_modified(|stopped| !std::mem::replace(stopped, true));
        debug!(first, "Shutdown triggered");
        first
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Waits until the trigger has been resolved.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // Sender is owned by `self`; an error here is unreachable.
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    /// A cloneable handle that can only resolve this trigger.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            trigger: self.clone(),
        }
    }
}

impl Default for ShutdownTrigger {
    fn default() -> Self {
        Self::new()
    }
}

/// The `stop` entry point handed to driving code. Idempotent, callable from
/// any thread or task.
#[derive(Debug, Clone)]
pub struct StopHandle {
    trigger: ShutdownTrigger,
}

impl StopHandle {
    pub fn stop(&self) {
        self.trigger.trigger();
    }

    pub fn is_stopped(&self) -> bool {
        self.trigger.is_triggered()
    }
}
