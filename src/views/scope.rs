//! Request scoping for views
//!
//! A `ViewScope` lives as long as its view. Requests run through
//! `ViewScope::run` and resolve to `None` once the scope is cancelled, so
//! their responses are dropped instead of written into view state.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Cancellation scope owned by one view; cancels itself on drop
pub struct ViewScope {
    handle: ScopeHandle,
}

/// Shareable handle that can cancel a scope from elsewhere
#[derive(Clone)]
pub struct ScopeHandle {
    cancelled: Arc<watch::Sender<bool>>,
}

impl ScopeHandle {
    pub fn cancel(&self) {
        if !self.cancelled.send_replace(true) {
            tracing::debug!("View scope cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            handle: ScopeHandle {
                cancelled: Arc::new(tx),
            },
        }
    }

    pub fn handle(&self) -> ScopeHandle {
        self.handle.clone()
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.handle.is_cancelled()
    }

    /// Drive `fut` unless the scope is cancelled first.
    ///
    /// Returns `None` when cancelled, before or during the request.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        let mut rx = self.handle.cancelled.subscribe();
        if *rx.borrow_and_update() {
            return None;
        }

        tokio::select! {
            output = fut => {
                // A cancel that raced the response still wins
                if self.is_cancelled() {
                    None
                } else {
                    Some(output)
                }
            }
            _ = rx.wait_for(|cancelled| *cancelled) => None,
        }
    }
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}
