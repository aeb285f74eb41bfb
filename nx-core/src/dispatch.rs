//! API priority dispatcher (spec.md §4.11): cooperative pre-emption so
//! foreground HIGH/CRITICAL requests make the background scanner yield.
//! Built on `tokio::sync::{Mutex, Notify}` the way the teacher's distributed
//! lock service builds a wait/signal primitive around `Notify` instead of
//! busy-polling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

/// The three priority classes coordinated by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    CriticalPlayback,
    HighUserAction,
    BackgroundSync,
}

struct Inner {
    critical_lock: Mutex<()>,
    critical_count: AtomicUsize,
    high_count: AtomicUsize,
    cleared: Notify,
}

/// Shared handle; clone freely across tasks (cheap `Arc` clone).
#[derive(Clone)]
pub struct PriorityDispatcher {
    inner: Arc<Inner>,
}

impl Default for PriorityDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PriorityDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                critical_lock: Mutex::new(()),
                critical_count: AtomicUsize::new(0),
                high_count: AtomicUsize::new(0),
                cleared: Notify::new(),
            }),
        }
    }

    /// True whenever any HIGH or CRITICAL holder is active (§4.11).
    #[must_use]
    pub fn should_yield(&self) -> bool {
        self.inner.critical_count.load(Ordering::SeqCst) > 0
            || self.inner.high_count.load(Ordering::SeqCst) > 0
    }

    /// Suspends the caller until `should_yield()` is false. A background
    /// scanner calls this between items; it will not resume before at least
    /// one foreground acquisition that was already active has completed
    /// (§4.11 ordering guarantee).
    pub async fn await_low_priority_clear(&self) {
        loop {
            if !self.should_yield() {
                return;
            }
            let notified = self.inner.cleared.notified();
            if !self.should_yield() {
                return;
            }
            notified.await;
        }
    }

    /// Runs `f` at CRITICAL priority. A second CRITICAL call waits on the
    /// shared mutex, so CRITICAL is effectively single-writer. The counter
    /// is decremented on every exit path, including cancellation (the guard
    /// drop runs even when the future containing this call is dropped
    /// mid-poll).
    pub async fn with_critical<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let _permit = self.inner.critical_lock.lock().await;
        let _guard = CountGuard::new(&self.inner.critical_count, &self.inner.cleared);
        f().await
    }

    /// Runs `f` at HIGH priority. HIGH does not block HIGH — any number of
    /// HIGH blocks may run concurrently; they only contend with CRITICAL
    /// through `should_yield`.
    pub async fn with_high<F, Fut, T>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = T>,
    {
        let _guard = CountGuard::new(&self.inner.high_count, &self.inner.cleared);
        f().await
    }
}

/// Increments `counter` on construction, decrements on every drop path
/// (normal return or cancellation-triggered unwind) and wakes anyone
/// parked in `await_low_priority_clear` once the counter reaches zero.
struct CountGuard<'a> {
    counter: &'a AtomicUsize,
    notify: &'a Notify,
}

impl<'a> CountGuard<'a> {
    fn new(counter: &'a AtomicUsize, notify: &'a Notify) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self { counter, notify }
    }
}

impl Drop for CountGuard<'_> {
    fn drop(&mut self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify.notify_waiters();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn should_yield_is_false_with_no_holders() {
        let dispatcher = PriorityDispatcher::new();
        assert!(!dispatcher.should_yield());
    }

    #[tokio::test]
    async fn high_makes_background_yield_until_it_completes() {
        let dispatcher = PriorityDispatcher::new();
        let bg = dispatcher.clone();
        let fg = dispatcher.clone();

        let background = tokio::spawn(async move {
            // Give the foreground task a chance to acquire HIGH first.
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(bg.should_yield());
            bg.await_low_priority_clear().await;
            assert!(!bg.should_yield());
        });

        fg.with_high(|| async {
            tokio::time::sleep(Duration::from_millis(30)).await;
        })
        .await;

        background.await.unwrap();
    }

    #[tokio::test]
    async fn critical_is_single_writer() {
        let dispatcher = PriorityDispatcher::new();
        let order = Arc::new(Mutex::new(Vec::<u32>::new()));

        let d1 = dispatcher.clone();
        let o1 = order.clone();
        let t1 = tokio::spawn(async move {
            d1.with_critical(|| async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                o1.lock().await.push(1);
            })
            .await;
        });

        tokio::time::sleep(Duration::from_millis(5)).await;

        let d2 = dispatcher.clone();
        let o2 = order.clone();
        let t2 = tokio::spawn(async move {
            d2.with_critical(|| async {
                o2.lock().await.push(2);
            })
            .await;
        });

        t1.await.unwrap();
        t2.await.unwrap();
        assert_eq!(*order.lock().await, vec![1, 2]);
    }

    #[tokio::test]
    async fn guard_decrements_on_cancellation() {
        let dispatcher = PriorityDispatcher::new();
        let d = dispatcher.clone();
        let handle = tokio::spawn(async move {
            d.with_high(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
            })
            .await;
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(dispatcher.should_yield());
        handle.abort();
        let _ = handle.await;

        // Give the aborted task's drop glue a beat to run.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!dispatcher.should_yield());
    }
}
