//! Provider node: owns the scope and runs the completion sentinel.
//!
//! The provider wraps the whole tree, creates the pass's [`HeadScope`], and
//! exposes [`HeadProvider::finish_pass`] - the sentinel step the host runs
//! after all children have rendered. Composition order guarantees every
//! synchronous producer registration for the pass has happened by then, so
//! the sentinel is the moment the gate may settle. Duplicate sentinel
//! execution (re-renders) is absorbed by the gate's idempotence.

use crate::scope::HeadScope;

/// The top-level node establishing the per-tree scope.
#[derive(Debug)]
pub struct HeadProvider {
    scope: HeadScope,
}

impl HeadProvider {
    /// Create a provider for a server pass.
    pub fn server() -> Self {
        Self {
            scope: HeadScope::server(),
        }
    }

    /// Create a provider for a client pass, hydrating from the embedded
    /// snapshot payload if present.
    pub fn client(embedded: Option<&str>) -> Self {
        Self {
            scope: HeadScope::client(embedded),
        }
    }

    /// The scope handed to every producer and collector in this tree.
    pub fn scope(&self) -> &HeadScope {
        &self.scope
    }

    /// The sentinel: mark the pass's synchronous registrations complete.
    /// Runs after all children have rendered; idempotent.
    pub fn finish_pass(&self) {
        self.scope.gate().mark_done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_pass_settles_gate() {
        let provider = HeadProvider::server();
        assert!(!provider.scope().gate().is_settled());
        provider.finish_pass();
        assert!(provider.scope().gate().is_settled());
    }

    #[test]
    fn test_finish_pass_is_idempotent() {
        let provider = HeadProvider::server();
        provider.finish_pass();
        provider.finish_pass();
        assert!(provider.scope().gate().is_settled());
    }
}
