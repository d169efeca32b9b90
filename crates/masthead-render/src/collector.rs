//! Collector node: the single per-render consumer of the collection.
//!
//! On the server the collector may be asked to render before the pass's
//! producers have registered; it then signals "not ready" by returning a
//! [`Suspended`] step carrying the gate to wait on. The host awaits it and
//! retries, and because the provider sentinel fires only after the whole
//! tree has rendered, the retry observes the complete contribution set -
//! the store is re-read on every attempt, never captured before suspension.
//!
//! On the client the gate is irrelevant: the collector renders the current
//! store snapshot (initially the hydrated server payload) and subscribes to
//! live updates. Exactly once, after first paint, it resets the store to
//! empty so post-hydration producer registrations become the sole source of
//! truth - without the reset, the server-seeded group would persist forever
//! and duplicate tags re-added by live producers.

use masthead_core::{
    CollectionState, CompletionGate, HeadElement, MastheadError, SnapshotScript, StoreSubscription,
};

use crate::scope::{HeadScope, RenderMode};

/// Reconciliation identity of one emitted tag: `(tag name, position)`.
///
/// Stable across re-renders even when attributes change, so the host engine
/// can reconcile in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementKey {
    /// Tag name of the element at this position.
    pub tag: String,
    /// Position in the flattened output.
    pub index: usize,
}

/// One emitted tag plus its reconciliation key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedElement {
    /// Reconciliation identity.
    pub key: ElementKey,
    /// The element itself.
    pub element: HeadElement,
}

/// What a collector emits on a completed render: the embedded snapshot
/// element followed by the flattened, keyed tags.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectorOutput {
    /// Machine-readable snapshot, embedded verbatim for the client.
    pub script: SnapshotScript,
    /// The flattened tags in final render order.
    pub tags: Vec<KeyedElement>,
}

/// A render attempt that must wait for the pass's completion gate.
#[derive(Debug, Clone)]
pub struct Suspended {
    gate: CompletionGate,
}

impl Suspended {
    /// Wait for the gate to settle, after which a render retry will observe
    /// the full post-completion collection.
    pub async fn wait(self) {
        self.gate.wait().await;
    }
}

/// One step of a collector render: either output, or a suspension the host
/// must wait out before retrying.
#[derive(Debug, Clone)]
pub enum RenderStep {
    /// The collection was ready; here is the output.
    Ready(CollectorOutput),
    /// Server pass, gate unsettled: retry after waiting.
    Suspended(Suspended),
}

/// The single per-render consumer node.
#[derive(Debug, Default)]
pub struct HeadCollector {
    reset_done: bool,
}

impl HeadCollector {
    /// Create a collector that has not yet performed its post-paint reset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to render the collection.
    ///
    /// On a server scope with an unsettled gate this returns
    /// [`RenderStep::Suspended`] and emits nothing; every attempt re-reads
    /// the store, so the post-settle retry sees all groups registered up to
    /// that point. Client scopes never suspend.
    pub fn render(&self, scope: &HeadScope) -> Result<RenderStep, MastheadError> {
        if scope.mode() == RenderMode::Server && !scope.gate().is_settled() {
            tracing::trace!("collector suspending on unsettled gate");
            return Ok(RenderStep::Suspended(Suspended {
                gate: scope.gate().clone(),
            }));
        }

        let heads = scope.flattened();
        let script = SnapshotScript::new(&heads)?;
        let tags = heads
            .into_iter()
            .enumerate()
            .map(|(index, element)| KeyedElement {
                key: ElementKey {
                    tag: element.tag_name.clone(),
                    index,
                },
                element,
            })
            .collect();
        Ok(RenderStep::Ready(CollectorOutput { script, tags }))
    }

    /// Subscribe to live store updates (client pass), re-rendering whenever
    /// the collection changes.
    pub fn subscribe<F>(&self, scope: &HeadScope, listener: F) -> StoreSubscription<CollectionState>
    where
        F: Fn() + Send + Sync + 'static,
    {
        scope.store().subscribe(listener)
    }

    /// Reset the store to the empty collection, exactly once, after first
    /// client paint. Later calls are no-ops.
    pub fn after_first_paint(&mut self, scope: &HeadScope) {
        if self.reset_done {
            return;
        }
        self.reset_done = true;
        tracing::debug!("post-paint reset: dropping hydrated snapshot groups");
        scope.store().dispatch(|_| Vec::new());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masthead_core::Fragment;

    use crate::producer::HeadProducer;

    fn ready_output(step: RenderStep) -> CollectorOutput {
        match step {
            RenderStep::Ready(output) => output,
            RenderStep::Suspended(_) => panic!("expected ready output"),
        }
    }

    #[test]
    fn test_server_render_suspends_until_gate_settles() {
        let scope = HeadScope::server();
        let collector = HeadCollector::new();
        assert!(matches!(
            collector.render(&scope).expect("render"),
            RenderStep::Suspended(_)
        ));

        scope.gate().mark_done();
        assert!(matches!(
            collector.render(&scope).expect("render"),
            RenderStep::Ready(_)
        ));
    }

    #[test]
    fn test_client_render_never_suspends() {
        let scope = HeadScope::client(None);
        let collector = HeadCollector::new();
        assert!(matches!(
            collector.render(&scope).expect("render"),
            RenderStep::Ready(_)
        ));
    }

    #[test]
    fn test_output_tags_are_keyed_by_tag_and_index() {
        let scope = HeadScope::server();
        let mut producer = HeadProducer::new(Fragment::group(vec![
            Fragment::element("meta").attr("name", "x"),
            Fragment::element("meta").attr("name", "y"),
        ]));
        producer.render_server(&scope).expect("register");
        scope.gate().mark_done();

        let output = ready_output(HeadCollector::new().render(&scope).expect("render"));
        let keys: Vec<_> = output.tags.iter().map(|t| t.key.clone()).collect();
        assert_eq!(
            keys,
            vec![
                ElementKey { tag: "meta".into(), index: 0 },
                ElementKey { tag: "meta".into(), index: 1 },
            ]
        );
    }

    #[test]
    fn test_post_paint_reset_runs_once() {
        let payload =
            masthead_core::encode(&[HeadElement::new("title", serde_json::Map::new())])
                .expect("encode");
        let scope = HeadScope::client(Some(&payload));
        let mut collector = HeadCollector::new();
        assert_eq!(scope.flattened().len(), 1);

        collector.after_first_paint(&scope);
        assert!(scope.flattened().is_empty());
        let version = scope.store().version();

        // Second call must not dispatch again.
        collector.after_first_paint(&scope);
        assert_eq!(scope.store().version(), version);
    }

    #[test]
    fn test_subscribe_reacts_to_producer_mounts() {
        let scope = HeadScope::client(None);
        let collector = HeadCollector::new();
        let notified = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let seen = notified.clone();
        let _sub = collector.subscribe(&scope, move || {
            seen.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        let mut producer = HeadProducer::new(Fragment::element("title").text_child("A"));
        producer.mount(&scope).expect("mount");
        assert_eq!(notified.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
