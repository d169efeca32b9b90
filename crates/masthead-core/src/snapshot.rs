//! Embedded snapshot payload codec.
//!
//! The server pass serializes the flattened collection into a JSON payload
//! embedded in the document (an `application/json` script element with a
//! reserved id), so the client can bootstrap the exact server collection
//! before any producer has mounted. Every literal `<` is unicode-escaped to
//! keep the payload from terminating its enclosing script element early.
//!
//! Decoding is forgiving: a missing or unparsable payload means "no prior
//! contributions", never an error.

use crate::element::HeadElement;
use crate::errors::MastheadError;

/// Reserved id of the embedded snapshot element.
pub const SNAPSHOT_ELEMENT_ID: &str = "__MASTHEAD_STATE__";

/// Content type of the embedded snapshot element.
pub const SNAPSHOT_CONTENT_TYPE: &str = "application/json";

/// Serialize a flattened collection to the embedded payload text.
///
/// Output is a JSON array of `{"type": ..., "props": ...}` objects in final
/// render order, with `<` escaped as `\u003c`.
pub fn encode(elements: &[HeadElement]) -> Result<String, MastheadError> {
    let json = serde_json::to_string(elements)
        .map_err(|e| MastheadError::serialization(e.to_string()))?;
    Ok(json.replace('<', "\\u003c"))
}

/// Parse an embedded payload back into a flattened collection.
///
/// Unparsable payloads decode to the empty collection; the failure is
/// logged and swallowed.
pub fn decode(payload: &str) -> Vec<HeadElement> {
    match serde_json::from_str(payload) {
        Ok(elements) => elements,
        Err(error) => {
            tracing::debug!(%error, "snapshot payload unparsable, defaulting to empty");
            Vec::new()
        }
    }
}

/// The snapshot element a collector embeds each render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotScript {
    /// Reserved element id the client looks up.
    pub id: &'static str,
    /// Escaped JSON body.
    pub json: String,
}

impl SnapshotScript {
    /// Build the snapshot element for a flattened collection.
    pub fn new(elements: &[HeadElement]) -> Result<Self, MastheadError> {
        Ok(Self {
            id: SNAPSHOT_ELEMENT_ID,
            json: encode(elements)?,
        })
    }
}
