//! One-shot readiness latch.
//!
//! The dispatcher fires a [`ReadySignal`] the first time the connection
//! reaches the ready state; the background scheduler holds a [`ReadyGate`]
//! and waits on it once before entering its periodic loop. A gate obtained
//! or awaited after the signal has already fired resolves immediately, so
//! there is no missed-signal deadlock.

use tokio::sync::watch;

/// The firing side of the latch.
#[derive(Debug, Clone)]
pub struct ReadySignal {
    tx: watch::Sender<bool>,
}

impl ReadySignal {
    /// Creates an unfired signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Marks readiness. Idempotent; later calls change nothing.
    pub fn notify(&self) {
        self.tx.send_replace(true);
    }

    /// Whether the signal has fired.
    pub fn is_ready(&self) -> bool {
        *self.tx.borrow()
    }

    /// Subscribes a new gate. Any number may be subscribed, before or after
    /// the signal fires.
    pub fn gate(&self) -> ReadyGate {
        ReadyGate {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for ReadySignal {
    fn default() -> Self {
        Self::new()
    }
}

/// The waiting side of the latch.
#[derive(Debug, Clone)]
pub struct ReadyGate {
    rx: watch::Receiver<bool>,
}

impl ReadyGate {
    /// Resolves once the signal has fired; immediately when it already has.
    ///
    /// Returns `false` when the signal was dropped without ever firing, in
    /// which case readiness can no longer be reached.
    pub async fn wait(&mut self) -> bool {
        self.rx.wait_for(|ready| *ready).await.is_ok()
    }
}
