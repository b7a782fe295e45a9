//! Cooperative shutdown signalling.
//!
//! A [`Shutdown`] token is created once in `main`, cancelled from the signal
//! handler, and cloned into every component that has suspension points. Loops
//! call [`Shutdown::check`] at iteration boundaries; sleeps select against
//! [`Shutdown::cancelled`].

use tokio::sync::watch;

/// Returned from any operation aborted by a shutdown request. Treated as a
/// clean, non-error exit at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("shutdown requested")]
pub struct Cancelled;

/// Cloneable cancellation token.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx, rx }
    }

    /// Request shutdown. Idempotent; wakes every pending [`cancelled`] call.
    ///
    /// [`cancelled`]: Shutdown::cancelled
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Fail fast at a loop boundary if shutdown was requested.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() { Err(Cancelled) } else { Ok(()) }
    }

    /// Resolve once shutdown is requested. Safe to call after the fact.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // wait_for returns immediately if the value already matches; an error
        // would mean the sender is gone, which cannot happen while self lives.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
