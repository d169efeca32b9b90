//! Minimal cooperative render driver.
//!
//! The render engine proper (tree walking, reconciliation, streaming) is an
//! external collaborator; this module is the smallest driver that honors
//! the contract the protocol needs from it:
//!
//! - depth-first completion ordering, so the provider sentinel runs after
//!   every descendant's synchronous registration;
//! - a suspension primitive: a suspended collector is retried after its
//!   wait future resolves, and only then;
//! - a post-paint effect phase on the client, run exactly once after the
//!   first commit.
//!
//! Each pass is fully independent: its own scope, store, and gate. The
//! driver never shares state across passes, so concurrent server passes
//! (concurrent requests) cannot leak head tags into each other's output.
//!
//! The client driver runs the collector's post-paint reset before producer
//! mount effects: the mount phase itself begins with the one-shot reset if
//! [`ClientPass::first_paint`] has not already run. Hydrated groups are
//! therefore dropped before any live registration arrives, and because the
//! reset is one-shot, a live registration is never wiped retroactively.

use masthead_core::{Fragment, MastheadError};

use crate::collector::{CollectorOutput, HeadCollector, RenderStep};
use crate::producer::HeadProducer;
use crate::provider::HeadProvider;
use crate::scope::HeadScope;

/// A node in the host's render tree.
#[derive(Debug, Clone)]
pub enum HeadNode {
    /// Establishes the scope for its subtree and runs the sentinel after
    /// its children complete.
    Provider {
        /// Subtree wrapped by this provider.
        children: Vec<HeadNode>,
    },
    /// Contributes its children fragment's extracted elements.
    Producer {
        /// The fragment handed to the extractor.
        children: Fragment,
    },
    /// The single per-pass consumer emitting the snapshot and the tags.
    Collector,
    /// A plain grouping node with no head behavior of its own.
    Plain {
        /// Subtree under this node.
        children: Vec<HeadNode>,
    },
}

impl HeadNode {
    /// Provider node wrapping the given children.
    pub fn provider(children: Vec<HeadNode>) -> Self {
        Self::Provider { children }
    }

    /// Producer node over a children fragment.
    pub fn producer(children: Fragment) -> Self {
        Self::Producer { children }
    }

    /// Collector node.
    pub fn collector() -> Self {
        Self::Collector
    }

    /// Plain grouping node.
    pub fn plain(children: Vec<HeadNode>) -> Self {
        Self::Plain { children }
    }
}

/// Result of a completed server pass.
#[derive(Debug)]
pub struct ServerOutput {
    /// The collector's emitted output, if the tree had a collector.
    pub collector: Option<CollectorOutput>,
    /// Whether the collector's first render attempt had to suspend.
    pub suspended_first_attempt: bool,
    /// The pass's scope, for inspection after the pass completes.
    pub scope: HeadScope,
}

#[derive(Default)]
struct ServerWalk {
    collector: Option<(HeadScope, bool)>,
}

/// Run a complete server pass over a tree rooted at a provider.
///
/// Producers register synchronously in document order; the sentinel fires
/// once the root provider's children have all rendered; a collector whose
/// first attempt suspended is retried after the gate settles.
pub async fn run_server_pass(tree: &HeadNode) -> Result<ServerOutput, MastheadError> {
    let HeadNode::Provider { children } = tree else {
        return Err(MastheadError::missing_scope(
            "server pass must be rooted at a provider: producers and collectors outside one have no scope",
        ));
    };

    let provider = HeadProvider::server();
    let scope = provider.scope().clone();
    let mut walk = ServerWalk::default();
    for child in children {
        render_server_node(child, &scope, &mut walk)?;
    }
    // Sentinel: all synchronous registrations for this pass are in.
    provider.finish_pass();

    let (collector, suspended_first_attempt) = match walk.collector {
        None => (None, false),
        Some((collector_scope, suspended_first)) => {
            let collector = HeadCollector::new();
            let output = loop {
                match collector.render(&collector_scope)? {
                    RenderStep::Ready(output) => break output,
                    RenderStep::Suspended(suspended) => suspended.wait().await,
                }
            };
            (Some(output), suspended_first)
        }
    };

    tracing::debug!(
        suspended = suspended_first_attempt,
        tags = collector.as_ref().map(|c| c.tags.len()).unwrap_or(0),
        "server pass complete"
    );
    Ok(ServerOutput {
        collector,
        suspended_first_attempt,
        scope,
    })
}

fn render_server_node(
    node: &HeadNode,
    scope: &HeadScope,
    walk: &mut ServerWalk,
) -> Result<(), MastheadError> {
    match node {
        HeadNode::Provider { children } => {
            // A nested provider starts an independent scope for its subtree.
            let provider = HeadProvider::server();
            for child in children {
                render_server_node(child, provider.scope(), walk)?;
            }
            provider.finish_pass();
        }
        HeadNode::Producer { children } => {
            // Server pass: synchronous registration during the render call.
            HeadProducer::new(children.clone()).render_server(scope)?;
        }
        HeadNode::Collector => {
            if walk.collector.is_some() {
                return Err(MastheadError::host(
                    "a render pass has exactly one collector",
                ));
            }
            // First attempt, at the collector's tree position: typically
            // before the sentinel, so it suspends and emits nothing.
            let attempt = HeadCollector::new().render(scope)?;
            let suspended = matches!(attempt, RenderStep::Suspended(_));
            walk.collector = Some((scope.clone(), suspended));
        }
        HeadNode::Plain { children } => {
            for child in children {
                render_server_node(child, scope, walk)?;
            }
        }
    }
    Ok(())
}

/// A hydrated client pass: renders from the embedded snapshot first, then
/// drives the effect phases (paint reset, producer mounts, live updates).
#[derive(Debug)]
pub struct ClientPass {
    scope: HeadScope,
    producers: Vec<HeadProducer>,
    collector: HeadCollector,
    has_collector: bool,
}

impl ClientPass {
    /// Hydrate a tree rooted at a provider from the server's embedded
    /// snapshot payload.
    ///
    /// Producers are instantiated but not yet mounted: the client mount
    /// phase is an effect phase, driven by [`ClientPass::mount_producers`]
    /// after [`ClientPass::first_paint`].
    pub fn hydrate(tree: &HeadNode, embedded: Option<&str>) -> Result<Self, MastheadError> {
        let HeadNode::Provider { children } = tree else {
            return Err(MastheadError::missing_scope(
                "client pass must be rooted at a provider: producers and collectors outside one have no scope",
            ));
        };

        let provider = HeadProvider::client(embedded);
        let scope = provider.scope().clone();
        let mut producers = Vec::new();
        let mut has_collector = false;
        for child in children {
            hydrate_node(child, &mut producers, &mut has_collector)?;
        }
        provider.finish_pass();

        Ok(Self {
            scope,
            producers,
            collector: HeadCollector::new(),
            has_collector,
        })
    }

    /// The pass's scope.
    pub fn scope(&self) -> &HeadScope {
        &self.scope
    }

    /// Render the collector against the current collection. Never
    /// suspends: the gate is irrelevant on the client.
    pub fn render(&self) -> Result<CollectorOutput, MastheadError> {
        if !self.has_collector {
            return Err(MastheadError::host("tree has no collector"));
        }
        match self.collector.render(&self.scope)? {
            RenderStep::Ready(output) => Ok(output),
            RenderStep::Suspended(_) => {
                Err(MastheadError::host("client render suspended"))
            }
        }
    }

    /// First client commit: run the collector's one-shot post-paint reset.
    pub fn first_paint(&mut self) {
        self.collector.after_first_paint(&self.scope);
    }

    /// Mount-effect phase: register every hydrated producer, in document
    /// order. Mount effects run after the first commit, so the phase begins
    /// with the post-paint reset if it has not run yet.
    pub fn mount_producers(&mut self) -> Result<(), MastheadError> {
        self.first_paint();
        for producer in &mut self.producers {
            producer.mount(&self.scope)?;
        }
        Ok(())
    }

    /// Mount a new producer after hydration (a dynamically appearing
    /// subtree). Returns its index for later unmount/update. Like
    /// [`ClientPass::mount_producers`], runs the pending post-paint reset
    /// first.
    pub fn mount_producer(&mut self, children: Fragment) -> Result<usize, MastheadError> {
        self.first_paint();
        let mut producer = HeadProducer::new(children);
        producer.mount(&self.scope)?;
        self.producers.push(producer);
        Ok(self.producers.len() - 1)
    }

    /// Tear down the producer at `index`, removing exactly its group.
    pub fn unmount_producer(&mut self, index: usize) -> Result<(), MastheadError> {
        let producer = self
            .producers
            .get_mut(index)
            .ok_or_else(|| MastheadError::host(format!("no producer at index {index}")))?;
        producer.unmount(&self.scope)
    }

    /// Re-render the producer at `index` with changed children
    /// (unmount-old + mount-new).
    pub fn update_producer(
        &mut self,
        index: usize,
        children: Fragment,
    ) -> Result<(), MastheadError> {
        let producer = self
            .producers
            .get_mut(index)
            .ok_or_else(|| MastheadError::host(format!("no producer at index {index}")))?;
        producer.update(&self.scope, children)
    }
}

fn hydrate_node(
    node: &HeadNode,
    producers: &mut Vec<HeadProducer>,
    has_collector: &mut bool,
) -> Result<(), MastheadError> {
    match node {
        HeadNode::Provider { .. } => Err(MastheadError::host(
            "client driver supports one provider per tree",
        )),
        HeadNode::Producer { children } => {
            producers.push(HeadProducer::new(children.clone()));
            Ok(())
        }
        HeadNode::Collector => {
            if *has_collector {
                return Err(MastheadError::host(
                    "a render pass has exactly one collector",
                ));
            }
            *has_collector = true;
            Ok(())
        }
        HeadNode::Plain { children } => {
            for child in children {
                hydrate_node(child, producers, has_collector)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_pass_requires_provider_root() {
        let tree = HeadNode::plain(vec![HeadNode::collector()]);
        assert!(matches!(
            run_server_pass(&tree).await,
            Err(MastheadError::MissingScope { .. })
        ));
    }

    #[tokio::test]
    async fn test_second_collector_is_rejected() {
        let tree = HeadNode::provider(vec![HeadNode::collector(), HeadNode::collector()]);
        assert!(matches!(
            run_server_pass(&tree).await,
            Err(MastheadError::Host { .. })
        ));
    }

    #[tokio::test]
    async fn test_server_pass_without_collector_completes() {
        let tree = HeadNode::provider(vec![HeadNode::producer(
            Fragment::element("title").text_child("A"),
        )]);
        let output = run_server_pass(&tree).await.expect("pass");
        assert!(output.collector.is_none());
        assert_eq!(output.scope.flattened().len(), 1);
    }

    #[test]
    fn test_client_hydrate_rejects_nested_provider() {
        let tree = HeadNode::provider(vec![HeadNode::provider(vec![])]);
        assert!(matches!(
            ClientPass::hydrate(&tree, None),
            Err(MastheadError::Host { .. })
        ));
    }
}
