//! Single-flight guard for token refresh
//!
//! Many requests can hit a 401 at once. Each of them enters the coordinator's
//! critical section; only one runs at a time, the rest queue in arrival order.
//! The section body re-checks the stored token first, so in practice one
//! network refresh serves the whole queue.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

/// FIFO mutual exclusion for the session's refresh critical section
///
/// Backed by [`tokio::sync::Mutex`], which queues waiters fairly and hands the
/// lock directly to the head of the queue on release. The guard is dropped on
/// every exit path of [`run`](Self::run), including errors and panics.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    gate: Mutex<()>,
    waiting: AtomicUsize,
}

/// Decrements the waiter count once the caller stops waiting, acquired or not
struct WaitTicket<'a>(&'a AtomicUsize);

impl<'a> WaitTicket<'a> {
    fn issue(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for WaitTicket<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RefreshCoordinator {
    /// Creates an unlocked coordinator
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `section` while holding the refresh lock
    pub async fn run<F, Fut, T>(&self, section: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = WaitTicket::issue(&self.waiting);
        let _guard = self.gate.lock().await;
        drop(ticket);

        section().await
    }

    /// Callers currently queued for the lock
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// True while some caller is inside the critical section
    pub fn is_held(&self) -> bool {
        self.gate.try_lock().is_err()
    }
}
