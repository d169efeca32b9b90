//! Head-element contributions and identity-keyed contribution groups.
//!
//! A [`HeadElement`] is one opaque `(tag name, attributes)` descriptor
//! registered by a producer. Producers register elements in groups: a
//! [`ContributionGroup`] is everything one producer instance contributed at
//! one point in time, and it is removed atomically by its [`GroupId`] when
//! that producer tears down. Groups are kept un-flattened in the collection
//! until output time so a producer's withdrawal removes exactly its own
//! elements, regardless of what sibling producers contributed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One opaque head-tag descriptor: a tag name plus its attribute bag.
///
/// The core never interprets tag names or attributes; validation and
/// deduplication are explicitly out of scope. The serde field names match
/// the embedded snapshot wire shape: `{"type": ..., "props": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadElement {
    /// Tag identifier, e.g. `"title"` or `"meta"`.
    #[serde(rename = "type")]
    pub tag_name: String,
    /// Opaque attribute bag. Children text, when present, travels as a
    /// `children` attribute the way the original props carry it.
    #[serde(rename = "props", default)]
    pub attributes: Map<String, Value>,
}

impl HeadElement {
    /// Create an element from a tag name and attribute bag.
    pub fn new(tag_name: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes,
        }
    }
}

/// Unique identity of a contribution group.
///
/// Removal is by id, never by content equality: two producers emitting
/// identical tags remain independently tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(Uuid);

impl GroupId {
    /// Generate a fresh group id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ordered elements one producer instance registered at one point in
/// time, tagged with a fresh identity at construction.
#[derive(Debug, Clone)]
pub struct ContributionGroup {
    id: GroupId,
    elements: Vec<HeadElement>,
}

impl ContributionGroup {
    /// Wrap a producer's extracted elements in a new group with a fresh id.
    pub fn new(elements: Vec<HeadElement>) -> Self {
        Self {
            id: GroupId::new(),
            elements,
        }
    }

    /// The group's identity.
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// The group's elements, in extraction order.
    pub fn elements(&self) -> &[HeadElement] {
        &self.elements
    }

    /// Number of elements in the group.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the group carries no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// The whole per-render collection: groups in arrival order.
pub type CollectionState = Vec<ContributionGroup>;

/// Flatten a collection into output order: group arrival order first, then
/// within-group extraction order.
pub fn flatten(state: &CollectionState) -> Vec<HeadElement> {
    state
        .iter()
        .flat_map(|group| group.elements().iter().cloned())
        .collect()
}
