//! One-shot completion signal for a render pass.
//!
//! A [`CompletionGate`] marks the moment no further synchronous producer
//! registrations can occur for the current pass. The gate does not decide
//! when that is - the render protocol's sentinel calls
//! [`CompletionGate::mark_done`] once the whole tree has rendered - it only
//! guarantees the settle is one-shot and that every waiter, past or future,
//! observes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

struct GateInner {
    settled: AtomicBool,
    tx: watch::Sender<bool>,
}

/// A settle-at-most-once signal with any number of async waiters.
///
/// Cloning shares the gate; exactly one gate exists per render pass, paired
/// with that pass's store. A gate dropped unsettled simply drops its
/// waiters (an abandoned render pass needs no explicit cancellation).
#[derive(Clone)]
pub struct CompletionGate {
    inner: Arc<GateInner>,
}

impl CompletionGate {
    /// Create an unsettled gate.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(GateInner {
                settled: AtomicBool::new(false),
                tx,
            }),
        }
    }

    /// Whether the gate has settled.
    pub fn is_settled(&self) -> bool {
        self.inner.settled.load(Ordering::Acquire)
    }

    /// Settle the gate. Idempotent: the first call wakes all waiters, every
    /// later call is a no-op.
    pub fn mark_done(&self) {
        if self.inner.settled.swap(true, Ordering::AcqRel) {
            return;
        }
        // send_replace stores the value even when no receiver is currently
        // subscribed; a waiter created after the settle must still observe
        // it. A plain send would fail and drop the value here.
        self.inner.tx.send_replace(true);
    }

    /// Wait until the gate settles. Resolves immediately if it already has.
    pub async fn wait(&self) {
        let mut rx = self.inner.tx.subscribe();
        // borrow_and_update observes a settle that happened before the
        // subscription was created.
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

impl Default for CompletionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CompletionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionGate")
            .field("settled", &self.is_settled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_gate_starts_unsettled() {
        let gate = CompletionGate::new();
        assert!(!gate.is_settled());
    }

    #[tokio::test]
    async fn test_mark_done_settles() {
        let gate = CompletionGate::new();
        gate.mark_done();
        assert!(gate.is_settled());
    }

    #[tokio::test]
    async fn test_mark_done_is_idempotent() {
        let gate = CompletionGate::new();
        gate.mark_done();
        gate.mark_done();
        assert!(gate.is_settled());
        // Waiters created after repeated settles still resolve.
        tokio::time::timeout(Duration::from_millis(100), gate.wait())
            .await
            .expect("settled gate must not block");
    }

    #[tokio::test]
    async fn test_settle_with_no_prior_waiters_reaches_later_waiters() {
        // No wait() has subscribed when the settle fires; a waiter created
        // afterwards must still resolve.
        let gate = CompletionGate::new();
        gate.mark_done();

        let late = gate.clone();
        tokio::time::timeout(Duration::from_millis(200), late.wait())
            .await
            .expect("settled gate must not block a later waiter");
    }

    #[tokio::test]
    async fn test_wait_resolves_immediately_when_already_settled() {
        let gate = CompletionGate::new();
        gate.mark_done();
        tokio::time::timeout(Duration::from_millis(100), gate.wait())
            .await
            .expect("settled gate must not block");
    }

    #[tokio::test]
    async fn test_wait_blocks_until_mark_done() {
        let gate = CompletionGate::new();

        let pending =
            tokio::time::timeout(Duration::from_millis(20), gate.wait()).await;
        assert!(pending.is_err(), "unsettled gate must block waiters");

        let waiter = gate.clone();
        let handle = tokio::spawn(async move { waiter.wait().await });
        gate.mark_done();
        tokio::time::timeout(Duration::from_millis(100), handle)
            .await
            .expect("waiter must resolve after mark_done")
            .expect("waiter task must not panic");
    }

    #[tokio::test]
    async fn test_multiple_waiters_all_resolve() {
        let gate = CompletionGate::new();
        let a = gate.clone();
        let b = gate.clone();
        let first = tokio::spawn(async move { a.wait().await });
        let second = tokio::spawn(async move { b.wait().await });

        gate.mark_done();
        for handle in [first, second] {
            tokio::time::timeout(Duration::from_millis(100), handle)
                .await
                .expect("waiter must resolve")
                .expect("waiter task must not panic");
        }
    }
}
