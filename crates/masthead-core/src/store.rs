//! `SyncStore<T>` - a versioned shared container with synchronous fan-out.
//!
//! The store holds one value per render tree. Any holder may transform it
//! through a pure reducer via [`SyncStore::dispatch`]; every registered
//! listener is then invoked synchronously, in registration order, before
//! `dispatch` returns. Listeners are never invoked except as the direct
//! consequence of a dispatch.
//!
//! # Runtime Agnostic Design
//!
//! Only std primitives (RwLock, AtomicU64) are used, so the store works
//! with any async runtime or in sync-only code. Cloning a `SyncStore`
//! shares the underlying state rather than duplicating it; exactly one
//! logical store exists per render tree.

// Allow expect on RwLock::read/write - lock poisoning from panics
// is unrecoverable, so expect() is the appropriate handling pattern.
#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, Weak};

type Listener = Arc<dyn Fn() + Send + Sync>;

struct ListenerEntry {
    id: u64,
    callback: Listener,
}

/// Inner state of a store, shared by all clones.
struct StoreInner<T> {
    /// The current value, replaced wholesale on each dispatch.
    state: RwLock<T>,
    /// Version counter incremented on each dispatch.
    version: AtomicU64,
    /// Registered listeners, in registration order.
    listeners: RwLock<Vec<ListenerEntry>>,
    /// Source of listener ids for exact unsubscription.
    next_listener_id: AtomicU64,
}

/// A shared, versioned value with reducer-based updates and synchronous
/// subscriber notification.
///
/// # Notification contract
///
/// - Every `dispatch` replaces the whole state with the reducer's return
///   value, then invokes all listeners registered at dispatch time, in
///   registration order, synchronously, before `dispatch` returns.
/// - Listeners registered during a notification pass are not invoked in
///   that same pass (the listener set is snapshotted first).
/// - Re-entrant `dispatch` from inside a listener nests: the inner call
///   fully completes before control returns. No lock is held while
///   listeners run.
#[derive(Clone)]
pub struct SyncStore<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> SyncStore<T> {
    /// Create a store with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(value),
                version: AtomicU64::new(0),
                listeners: RwLock::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.inner
            .state
            .read()
            .expect("store lock poisoned")
            .clone()
    }

    /// Get the current version number, incremented on each dispatch.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Apply a pure reducer to the current value, store the result, then
    /// notify every currently-registered listener.
    pub fn dispatch<F>(&self, reducer: F)
    where
        F: FnOnce(T) -> T,
    {
        let next = reducer(self.get());
        {
            let mut guard = self.inner.state.write().expect("store lock poisoned");
            *guard = next;
        }
        self.inner.version.fetch_add(1, Ordering::Release);

        // Snapshot the listener set before invoking: listeners registered
        // during this pass must not run in it, and listeners may dispatch
        // re-entrantly once the locks are released.
        let snapshot: Vec<Listener> = {
            let guard = self.inner.listeners.read().expect("store lock poisoned");
            guard.iter().map(|entry| entry.callback.clone()).collect()
        };
        for listener in snapshot {
            listener();
        }
    }

    /// Register a change listener.
    ///
    /// The listener is invoked with no arguments after every dispatch until
    /// the returned [`StoreSubscription`] unsubscribes (explicitly or on
    /// drop).
    pub fn subscribe<F>(&self, listener: F) -> StoreSubscription<T>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .write()
            .expect("store lock poisoned")
            .push(ListenerEntry {
                id,
                callback: Arc::new(listener),
            });
        StoreSubscription {
            store: Arc::downgrade(&self.inner),
            id,
            removed: false,
        }
    }

    /// Number of currently-registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .read()
            .expect("store lock poisoned")
            .len()
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for SyncStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncStore")
            .field("value", &self.get())
            .field("version", &self.version())
            .finish()
    }
}

/// Handle to a registered listener; removes exactly that listener on
/// [`StoreSubscription::unsubscribe`] or drop.
pub struct StoreSubscription<T> {
    store: Weak<StoreInner<T>>,
    id: u64,
    removed: bool,
}

impl<T> StoreSubscription<T> {
    /// Remove the listener. Safe to call multiple times; the second call is
    /// a no-op.
    pub fn unsubscribe(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        if let Some(inner) = self.store.upgrade() {
            inner
                .listeners
                .write()
                .expect("store lock poisoned")
                .retain(|entry| entry.id != self.id);
        }
    }
}

impl<T> Drop for StoreSubscription<T> {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
