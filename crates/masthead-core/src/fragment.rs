//! The closed node set producers hand to the extractor.
//!
//! A producer's children are an arbitrarily nested tree fragment. The
//! extractor classifies nodes three ways, and [`Fragment`] models exactly
//! that classification:
//!
//! - [`Fragment::Element`]: a primitive tag node, emitted as one element
//! - [`Fragment::Group`]: a transparent wrapper, recursed into and spliced
//!   in place
//! - [`Fragment::Opaque`]: anything else (composite components, text,
//!   null), dropped without error

use serde_json::{Map, Value};

/// A node in a producer's children tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// A primitive element: a plain tag identifier with an attribute bag.
    Element {
        /// Tag identifier.
        tag: String,
        /// Attribute bag, including any `children` text.
        attributes: Map<String, Value>,
    },
    /// A transparent grouping node with no rendering identity of its own.
    Group(Vec<Fragment>),
    /// A node the extractor drops: composite component, text, null.
    Opaque,
}

impl Fragment {
    /// Create a primitive element node with no attributes.
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element {
            tag: tag.into(),
            attributes: Map::new(),
        }
    }

    /// Create a transparent grouping node.
    pub fn group(children: Vec<Fragment>) -> Self {
        Self::Group(children)
    }

    /// Add an attribute. No-op on non-element nodes.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Self::Element { attributes, .. } = &mut self {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    /// Fold text content into the element's `children` attribute, the way
    /// the original props carry `<title>text</title>`.
    pub fn text_child(self, text: impl Into<String>) -> Self {
        self.attr("children", text.into())
    }
}
