//! Cooperative cancellation for in-flight sessions.

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable stop signal.
///
/// Cloning shares the signal: any clone's [`CancelToken::stop`] wakes every
/// task waiting in [`CancelToken::cancelled`]. Stopping twice is harmless.
#[derive(Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request that every session holding a clone stop at the next await.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`CancelToken::stop`] has been called.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}
