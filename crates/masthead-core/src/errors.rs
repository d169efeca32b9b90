//! Unified error type for masthead operations.

use serde::{Deserialize, Serialize};

/// Unified error type for all masthead operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum MastheadError {
    /// A producer or collector was used outside an active provider scope.
    /// This is a programmer error: with no scope, no synchronization is
    /// happening and output would be silently dropped.
    #[error("Missing scope: {message}")]
    MissingScope {
        /// Where the scope lookup failed
        message: String,
    },

    /// A producer instance registered through both the synchronous server
    /// path and the mount-effect path in one pass. The host environment is
    /// expected to run exactly one of the two; observing both is failed
    /// loudly rather than double-registering silently.
    #[error("Double registration: {message}")]
    DoubleRegistration {
        /// Which producer and which paths collided
        message: String,
    },

    /// Snapshot payload serialization failed.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// The host driver was asked to do something the render protocol does
    /// not allow (a second collector in one pass, unmounting a producer
    /// that never mounted, ...).
    #[error("Host protocol error: {message}")]
    Host {
        /// Error message describing the protocol violation
        message: String,
    },
}

impl MastheadError {
    /// Create a missing-scope error
    pub fn missing_scope(message: impl Into<String>) -> Self {
        Self::MissingScope {
            message: message.into(),
        }
    }

    /// Create a double-registration error
    pub fn double_registration(message: impl Into<String>) -> Self {
        Self::DoubleRegistration {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a host protocol error
    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }
}
