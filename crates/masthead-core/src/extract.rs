//! Pure extraction of head elements from a children fragment.
//!
//! This is a filter, not a validation step: primitive elements are emitted,
//! transparent groups are recursed into and spliced in place, and every
//! other node kind contributes nothing. Deterministic and side-effect free;
//! cyclic structures are not a legal input and are not guarded against.

use crate::element::HeadElement;
use crate::fragment::Fragment;

/// Flatten a fragment tree into its ordered head-element contributions.
pub fn extract(fragment: &Fragment) -> Vec<HeadElement> {
    match fragment {
        Fragment::Element { tag, attributes } => {
            vec![HeadElement::new(tag.clone(), attributes.clone())]
        }
        Fragment::Group(children) => children.iter().flat_map(extract).collect(),
        Fragment::Opaque => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_single_element() {
        let extracted = extract(&Fragment::element("title").text_child("A"));
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].tag_name, "title");
    }

    #[test]
    fn test_extract_opaque_is_empty() {
        assert!(extract(&Fragment::Opaque).is_empty());
    }

    #[test]
    fn test_extract_splices_nested_groups_in_order() {
        let tree = Fragment::group(vec![
            Fragment::element("title"),
            Fragment::group(vec![
                Fragment::element("meta").attr("name", "x"),
                Fragment::group(vec![Fragment::element("link")]),
            ]),
            Fragment::element("base"),
        ]);
        let tags: Vec<_> = extract(&tree).into_iter().map(|e| e.tag_name).collect();
        assert_eq!(tags, vec!["title", "meta", "link", "base"]);
    }

    #[test]
    fn test_extract_drops_opaque_children_silently() {
        let tree = Fragment::group(vec![
            Fragment::Opaque,
            Fragment::element("meta").attr("name", "x"),
            Fragment::Opaque,
        ]);
        let extracted = extract(&tree);
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].tag_name, "meta");
    }

    #[test]
    fn test_extract_preserves_attributes() {
        let extracted = extract(
            &Fragment::element("meta")
                .attr("name", "description")
                .attr("content", "a<b"),
        );
        assert_eq!(
            extracted[0].attributes.get("content"),
            Some(&serde_json::Value::String("a<b".into()))
        );
    }
}
