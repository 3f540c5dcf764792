//! Bounding-box containment filter.
//!
//! Clickable containers (links, buttons, combobox widgets) push their
//! rectangle down to every descendant. A descendant that sits inside that
//! rectangle is decorative markup of the container, so it is marked
//! `excluded_by_parent` and the model sees one actionable element instead of
//! several nested ones.

use tracing::trace;

use crate::state::SimplifiedNode;
use crate::tree::{DomTree, NodeId, RawNode, Rect};

/// `(tag, role)` pairs whose bounds propagate; `None` matches any role.
const PROPAGATING_ELEMENTS: &[(&str, Option<&str>)] = &[
    ("a", None),
    ("button", None),
    ("div", Some("button")),
    ("div", Some("combobox")),
    ("span", Some("button")),
    ("span", Some("combobox")),
    ("input", Some("combobox")),
];

/// Form controls keep their own index even inside a container.
const FORM_CONTROLS: &[&str] = &["input", "select", "textarea", "label"];

const INDEPENDENT_ROLES: &[&str] = &["button", "link", "checkbox", "radio", "tab", "menuitem"];

/// The container whose rectangle is active during the walk.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PropagatingBounds {
    pub tag: String,
    pub bounds: Rect,
    pub node_id: NodeId,
    pub depth: usize,
}

pub(crate) struct BoundingBoxFilter {
    containment_threshold: f64,
}

impl BoundingBoxFilter {
    pub(crate) fn new(containment_threshold: f64) -> Self {
        Self {
            containment_threshold,
        }
    }

    /// Mark contained descendants; returns how many nodes were excluded.
    pub(crate) fn apply(&self, tree: &DomTree, root: &mut SimplifiedNode) -> usize {
        let mut excluded = 0;
        self.walk(tree, root, None, 0, &mut excluded);
        excluded
    }

    fn walk(
        &self,
        tree: &DomTree,
        node: &mut SimplifiedNode,
        active: Option<&PropagatingBounds>,
        depth: usize,
        excluded: &mut usize,
    ) {
        let raw = &tree[node.node_id];

        // Decided before this node can start its own propagation
        if let Some(active) = active {
            if self.is_contained(raw, active) {
                node.excluded_by_parent = true;
                node.should_display = false;
                *excluded += 1;
                trace!(
                    node_id = raw.node_id,
                    tag = %raw.tag_name,
                    container = %active.tag,
                    "excluded by container bounds"
                );
            }
        }

        let own = if is_propagating(raw) {
            raw.bounds().map(|bounds| PropagatingBounds {
                tag: raw.tag_name.clone(),
                bounds: *bounds,
                node_id: node.node_id,
                depth,
            })
        } else {
            None
        };
        let next = own.as_ref().or(active);

        for child in &mut node.children {
            self.walk(tree, child, next, depth + 1, excluded);
        }
    }

    fn is_contained(&self, raw: &RawNode, active: &PropagatingBounds) -> bool {
        if is_exception(raw) {
            return false;
        }
        let Some(bounds) = raw.bounds() else {
            return false;
        };
        match containment_ratio(bounds, &active.bounds) {
            Some(ratio) => ratio >= self.containment_threshold,
            None => false,
        }
    }
}

/// Fraction of `child`'s area inside `container`; `None` for zero-area children.
pub(crate) fn containment_ratio(child: &Rect, container: &Rect) -> Option<f64> {
    let area = child.area();
    if area <= 0.0 {
        return None;
    }
    Some(child.intersection_area(container) / area)
}

pub(crate) fn is_propagating(raw: &RawNode) -> bool {
    if !raw.is_element() {
        return false;
    }
    let role = raw.role();
    PROPAGATING_ELEMENTS.iter().any(|(tag, expected)| {
        raw.tag_name == *tag
            && match expected {
                None => true,
                Some(expected) => role.as_deref() == Some(*expected),
            }
    })
}

fn is_exception(raw: &RawNode) -> bool {
    if raw.is_text() {
        return true;
    }
    if FORM_CONTROLS.contains(&raw.tag_name.as_str()) {
        return true;
    }
    if is_propagating(raw) {
        return true;
    }
    if raw.attributes.contains_key("onclick") {
        return true;
    }
    if raw.attr("aria-label").is_some_and(|l| !l.trim().is_empty()) {
        return true;
    }
    raw.role()
        .is_some_and(|r| INDEPENDENT_ROLES.contains(&r.as_str()))
}

#[cfg(test)]
#[path = "bbox_tests.rs"]
mod tests;
