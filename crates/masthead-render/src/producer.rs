//! Producer node: registers one contribution group per mounted instance.
//!
//! Each [`HeadProducer`] moves through `Unmounted -> Registered ->
//! Unmounted`. On the client the transition to `Registered` happens in the
//! mount-effect phase; on the server it happens synchronously during the
//! render call itself, because a server pass has no mount phase. The host
//! environment runs exactly one of the two paths per pass - a producer that
//! observes both fails loudly rather than double-registering.
//!
//! The group is keyed to the registration instance, not the producer's
//! logical identity: a children change on the client is unmount-old +
//! mount-new with a fresh group id.

use masthead_core::{extract, ContributionGroup, Fragment, GroupId, MastheadError};

use crate::scope::{HeadScope, RenderMode};

/// Which path registered the current group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegistrationPath {
    /// Synchronous registration during the server render call.
    ServerRender,
    /// Client mount-effect registration.
    MountEffect,
}

#[derive(Debug, Clone, Copy)]
struct Registration {
    group_id: GroupId,
    path: RegistrationPath,
}

/// A tree node that contributes its children's extracted head elements as
/// one atomically-removable group.
#[derive(Debug)]
pub struct HeadProducer {
    children: Fragment,
    registration: Option<Registration>,
}

impl HeadProducer {
    /// Create an unmounted producer over the given children fragment.
    pub fn new(children: Fragment) -> Self {
        Self {
            children,
            registration: None,
        }
    }

    /// The children this producer extracts from.
    pub fn children(&self) -> &Fragment {
        &self.children
    }

    /// The id of the currently-registered group, if any.
    pub fn group_id(&self) -> Option<GroupId> {
        self.registration.map(|r| r.group_id)
    }

    /// Server path: register synchronously, during the render call itself.
    pub fn render_server(&mut self, scope: &HeadScope) -> Result<(), MastheadError> {
        if scope.mode() != RenderMode::Server {
            return Err(MastheadError::host(
                "render_server called on a client scope; client producers register via mount",
            ));
        }
        self.register(scope, RegistrationPath::ServerRender)
    }

    /// Client path: register in the mount-effect phase.
    pub fn mount(&mut self, scope: &HeadScope) -> Result<(), MastheadError> {
        if scope.mode() != RenderMode::Client {
            return Err(MastheadError::host(
                "mount called on a server scope; a server pass has no mount phase",
            ));
        }
        self.register(scope, RegistrationPath::MountEffect)
    }

    /// Teardown: remove exactly this instance's group, by id.
    pub fn unmount(&mut self, scope: &HeadScope) -> Result<(), MastheadError> {
        let registration = self.registration.take().ok_or_else(|| {
            MastheadError::host("unmount of a producer that never registered")
        })?;
        let id = registration.group_id;
        tracing::trace!(group = %id, "removing producer group");
        scope
            .store()
            .dispatch(move |state| state.into_iter().filter(|g| g.id() != id).collect());
        Ok(())
    }

    /// Client re-render with changed children: unmount-old + mount-new,
    /// producing a fresh group id.
    pub fn update(&mut self, scope: &HeadScope, children: Fragment) -> Result<(), MastheadError> {
        self.unmount(scope)?;
        self.children = children;
        self.mount(scope)
    }

    fn register(
        &mut self,
        scope: &HeadScope,
        path: RegistrationPath,
    ) -> Result<(), MastheadError> {
        if let Some(existing) = self.registration {
            return Err(MastheadError::double_registration(format!(
                "producer already registered group {} via {:?}, now asked to register via {:?}",
                existing.group_id, existing.path, path
            )));
        }
        let group = ContributionGroup::new(extract(&self.children));
        let group_id = group.id();
        tracing::trace!(group = %group_id, elements = group.len(), ?path, "registering producer group");
        scope.store().dispatch(move |mut state| {
            state.push(group);
            state
        });
        self.registration = Some(Registration { group_id, path });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(text: &str) -> Fragment {
        Fragment::element("title").text_child(text)
    }

    #[test]
    fn test_server_render_registers_synchronously() {
        let scope = HeadScope::server();
        let mut producer = HeadProducer::new(title("A"));
        producer.render_server(&scope).expect("register");

        let flat = scope.flattened();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].tag_name, "title");
    }

    #[test]
    fn test_mount_rejected_on_server_scope() {
        let scope = HeadScope::server();
        let mut producer = HeadProducer::new(title("A"));
        assert!(matches!(
            producer.mount(&scope),
            Err(MastheadError::Host { .. })
        ));
    }

    #[test]
    fn test_render_server_rejected_on_client_scope() {
        let scope = HeadScope::client(None);
        let mut producer = HeadProducer::new(title("A"));
        assert!(matches!(
            producer.render_server(&scope),
            Err(MastheadError::Host { .. })
        ));
    }

    #[test]
    fn test_double_registration_fails_loudly() {
        let scope = HeadScope::client(None);
        let mut producer = HeadProducer::new(title("A"));
        producer.mount(&scope).expect("first registration");
        assert!(matches!(
            producer.mount(&scope),
            Err(MastheadError::DoubleRegistration { .. })
        ));
        // The store still holds exactly one group from this producer.
        assert_eq!(scope.flattened().len(), 1);
    }

    #[test]
    fn test_unmount_removes_own_group_only() {
        let scope = HeadScope::client(None);
        let mut a = HeadProducer::new(title("A"));
        let mut b = HeadProducer::new(title("B"));
        a.mount(&scope).expect("mount a");
        b.mount(&scope).expect("mount b");

        a.unmount(&scope).expect("unmount a");
        let flat = scope.flattened();
        assert_eq!(flat.len(), 1);
        assert_eq!(
            flat[0].attributes.get("children"),
            Some(&serde_json::Value::String("B".into()))
        );
    }

    #[test]
    fn test_unmount_without_registration_errors() {
        let scope = HeadScope::client(None);
        let mut producer = HeadProducer::new(title("A"));
        assert!(matches!(
            producer.unmount(&scope),
            Err(MastheadError::Host { .. })
        ));
    }

    #[test]
    fn test_update_swaps_group_identity() {
        let scope = HeadScope::client(None);
        let mut producer = HeadProducer::new(title("A"));
        producer.mount(&scope).expect("mount");
        let first_id = producer.group_id().expect("registered");

        producer.update(&scope, title("B")).expect("update");
        let second_id = producer.group_id().expect("registered");
        assert_ne!(first_id, second_id);

        let flat = scope.flattened();
        assert_eq!(flat.len(), 1);
        assert_eq!(
            flat[0].attributes.get("children"),
            Some(&serde_json::Value::String("B".into()))
        );
    }

    #[test]
    fn test_identical_content_remains_independently_tracked() {
        let scope = HeadScope::client(None);
        let mut a = HeadProducer::new(title("same"));
        let mut b = HeadProducer::new(title("same"));
        a.mount(&scope).expect("mount a");
        b.mount(&scope).expect("mount b");

        a.unmount(&scope).expect("unmount a");
        // b's identical contribution survives: removal is by identity.
        assert_eq!(scope.flattened().len(), 1);
    }
}
