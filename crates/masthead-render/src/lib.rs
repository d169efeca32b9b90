//! Masthead Render - The Head-Collection Render Protocol
//!
//! This crate layers the render protocol over `masthead-core`'s
//! primitives:
//!
//! - [`HeadScope`](scope::HeadScope): the explicit per-tree handle pairing
//!   the store with the completion gate.
//! - [`HeadProducer`](producer::HeadProducer): registers one
//!   atomically-removable contribution group per mounted instance.
//! - [`HeadCollector`](collector::HeadCollector): the single per-pass
//!   consumer; suspends on the server until the gate settles, renders live
//!   snapshots on the client, and performs the one-shot post-paint reset.
//! - [`HeadProvider`](provider::HeadProvider): owns the scope and runs the
//!   completion sentinel after its children render.
//! - [`host`]: a minimal cooperative driver satisfying the engine contract
//!   (depth-first ordering, suspension retry, post-paint effects), used by
//!   the integration tests and as the reference embedding.

#![forbid(unsafe_code)]

/// Collector node and its keyed output
pub mod collector;

/// Minimal cooperative render driver
pub mod host;

/// Producer node state machine
pub mod producer;

/// Provider node and completion sentinel
pub mod provider;

/// Per-render-tree scope
pub mod scope;

pub use collector::{CollectorOutput, ElementKey, HeadCollector, KeyedElement, RenderStep, Suspended};
pub use host::{run_server_pass, ClientPass, HeadNode, ServerOutput};
pub use producer::HeadProducer;
pub use provider::HeadProvider;
pub use scope::{HeadScope, RenderMode};
