//! The per-render-tree scope: store, gate, and render mode.
//!
//! A [`HeadScope`] is the explicit handle through which every producer and
//! the collector locate the current render's store and completion gate.
//! One scope exists per render tree; it is cloned by reference into every
//! node, never duplicated logically and never shared across trees (a
//! shared scope would leak one pass's head tags into another's output).

use masthead_core::{
    decode, flatten, CollectionState, CompletionGate, ContributionGroup, HeadElement, SyncStore,
};

/// Which kind of render pass this scope serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Initial streamable render; the collector may suspend on the gate.
    Server,
    /// Post-delivery render; bootstraps from the embedded snapshot and
    /// thereafter reacts live to producer mounts and unmounts.
    Client,
}

/// The shared handle for one render tree: store + gate + mode.
///
/// Lifetime equals the render tree's lifetime: created at tree-root mount,
/// dropped when the root unmounts. No teardown beyond drop is required.
#[derive(Clone)]
pub struct HeadScope {
    store: SyncStore<CollectionState>,
    gate: CompletionGate,
    mode: RenderMode,
}

impl HeadScope {
    /// Create a scope for a server pass: empty collection, unsettled gate.
    pub fn server() -> Self {
        Self {
            store: SyncStore::new(Vec::new()),
            gate: CompletionGate::new(),
            mode: RenderMode::Server,
        }
    }

    /// Create a scope for a client pass, bootstrapped from the embedded
    /// snapshot payload if present.
    ///
    /// The decoded elements are seeded as one contribution group so the
    /// client's first render reproduces the server's output exactly; the
    /// collector's post-paint reset later discards the seed in favor of
    /// live client registrations. A missing or unparsable payload seeds an
    /// empty group.
    pub fn client(embedded: Option<&str>) -> Self {
        let seeded = embedded.map(decode).unwrap_or_default();
        tracing::debug!(elements = seeded.len(), "hydrating client scope");
        Self {
            store: SyncStore::new(vec![ContributionGroup::new(seeded)]),
            gate: CompletionGate::new(),
            mode: RenderMode::Client,
        }
    }

    /// The pass kind this scope serves.
    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// The shared store.
    pub fn store(&self) -> &SyncStore<CollectionState> {
        &self.store
    }

    /// The pass's completion gate.
    pub fn gate(&self) -> &CompletionGate {
        &self.gate
    }

    /// Snapshot of the current collection, un-flattened.
    pub fn collection(&self) -> CollectionState {
        self.store.get()
    }

    /// Current collection flattened into output order.
    pub fn flattened(&self) -> Vec<HeadElement> {
        flatten(&self.store.get())
    }
}

impl std::fmt::Debug for HeadScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadScope")
            .field("mode", &self.mode)
            .field("groups", &self.store.get().len())
            .field("settled", &self.gate.is_settled())
            .finish()
    }
}
