//! Shared cancellation token for winding down the discovery loops.

use tokio::sync::watch;

/// A cancellation token the emitter and listener check in their select loops.
///
/// Cloneable handles all observe the same stop signal; sending it is
/// idempotent.
#[derive(Debug)]
pub struct ShutdownToken {
    stop_tx: watch::Sender<bool>,
    stop_rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);
        Self { stop_tx, stop_rx }
    }

    /// Get a new subscription to the stop signal for a select loop.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.stop_rx.clone()
    }

    /// Signal all subscribers to stop.
    pub fn signal_stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Whether the stop signal has been sent.
    pub fn is_stopped(&self) -> bool {
        *self.stop_rx.borrow()
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}
