//! Masthead Core - Per-Render Head-Element Collection Primitives
//!
//! This crate provides the synchronization primitives that let nested
//! producers register head elements during a tree render and let a single
//! consumer emit the collected list exactly once per pass:
//!
//! - [`SyncStore<T>`](store::SyncStore): a versioned shared container with
//!   reducer-based updates and synchronous subscriber notification.
//! - [`CompletionGate`](gate::CompletionGate): a one-shot "all synchronous
//!   registrations are in" signal with async waiters.
//! - [`Fragment`](fragment::Fragment) + [`extract`](extract::extract): the
//!   closed node set of producer children and its pure flattening.
//! - [`snapshot`]: the embedded JSON payload the client bootstraps from.
//!
//! # Layering
//!
//! Everything here is runtime-agnostic and free of render-protocol logic
//! (std sync primitives plus a tokio watch channel for the gate). The
//! protocol itself - scopes, producers, the suspending collector - lives in
//! `masthead-render` on top of these primitives.

#![forbid(unsafe_code)]

/// Head elements, identity-keyed contribution groups, flattening
pub mod element;

/// Unified error handling
pub mod errors;

/// Pure extraction of contributions from a children fragment
pub mod extract;

/// The closed node set handed to the extractor
pub mod fragment;

/// One-shot completion signal
pub mod gate;

/// Embedded snapshot payload codec
pub mod snapshot;

/// Versioned shared store with synchronous fan-out
pub mod store;

pub use element::{flatten, CollectionState, ContributionGroup, GroupId, HeadElement};
pub use errors::MastheadError;
pub use extract::extract;
pub use fragment::Fragment;
pub use gate::CompletionGate;
pub use snapshot::{decode, encode, SnapshotScript, SNAPSHOT_CONTENT_TYPE, SNAPSHOT_ELEMENT_ID};
pub use store::{StoreSubscription, SyncStore};
