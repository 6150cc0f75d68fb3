//! Live session accounting
//!
//! Each server owns a [`SessionTracker`]. Every accepted connection holds a
//! [`SessionGuard`] for as long as it is being served, which lets shutdown
//! wait for in-flight sessions without touching them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    active: AtomicUsize,
    idle: Notify,
}

/// Counter of live sessions, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    inner: Arc<Inner>,
}

impl SessionTracker {
    /// Create a tracker with no live sessions
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session; it ends when the guard is dropped
    pub fn track(&self) -> SessionGuard {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        SessionGuard {
            inner: self.inner.clone(),
        }
    }

    /// Number of sessions currently live
    pub fn active(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Wait until no session is live
    pub async fn wait_idle(&self) {
        loop {
            // Register interest before checking to avoid missing a wakeup
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.active() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// RAII guard that ends its session on drop
#[derive(Debug)]
pub struct SessionGuard {
    inner: Arc<Inner>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}
