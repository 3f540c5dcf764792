//! Interactivity detection.
//!
//! Layered checks, cheapest first:
//! 1. Native interactive tags (a[href], button, input, select, ...)
//! 2. Event handler attributes, tabindex and contenteditable
//! 3. ARIA roles (attribute or accessibility tree)
//! 4. Accessibility states (focusable, editable, checked, expanded, ...)
//! 5. Layout clickability hint from the snapshot
//! 6. Cursor: pointer style
//! 7. IFRAME size

use std::collections::HashMap;

use serde_json::Value;
use tracing::trace;

use crate::tree::{DomTree, NodeId, RawNode};

/// Predicate deciding whether an element accepts user interaction.
///
/// Implementations must be deterministic for a given tree; the pipeline
/// caches answers per `node_id` for the duration of one call.
pub trait InteractivityDetector: Send + Sync {
    fn is_interactive(&self, tree: &DomTree, node: &RawNode) -> bool;
}

const INTERACTIVE_TAGS: &[&str] = &[
    "button", "input", "select", "textarea", "option", "details", "summary",
];

const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "menuitem", "menuitemcheckbox", "menuitemradio", "option", "radio",
    "checkbox", "tab", "textbox", "combobox", "slider", "spinbutton", "searchbox", "switch",
    "treeitem", "listbox",
];

/// Controls that make a wrapping `<label>` clickable.
const LABELLED_CONTROL_TAGS: &[&str] = &["input", "select", "textarea"];

const EVENT_HANDLER_ATTRIBUTES: &[&str] = &[
    "onclick", "onmousedown", "onmouseup", "onkeydown", "onkeyup",
];

/// Accessibility properties whose truthy value marks a widget.
const TRUTHY_AX_PROPERTIES: &[&str] = &["focusable", "editable", "settable"];

/// Accessibility states that only widgets carry.
const STATE_AX_PROPERTIES: &[&str] = &["checked", "expanded", "pressed", "selected"];

const MIN_IFRAME_SIZE: f64 = 100.0;

/// Default detector combining DOM, accessibility and layout signals.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultInteractivityDetector;

impl DefaultInteractivityDetector {
    pub fn new() -> Self {
        Self
    }

    /// Name of the first layer that marks the node interactive.
    pub fn reason(&self, tree: &DomTree, node: &RawNode) -> Option<&'static str> {
        if !node.is_element() {
            return None;
        }
        let tag = node.tag_name.as_str();
        if tag == "html" || tag == "body" {
            return None;
        }
        if is_disabled(node) {
            return None;
        }

        // Layer 1: native interactive tags
        if INTERACTIVE_TAGS.contains(&tag) {
            return Some("native_tag");
        }
        if tag == "a" && node.attributes.contains_key("href") {
            return Some("link_href");
        }
        if tag == "label" && node.attributes.contains_key("for") {
            return Some("label_for");
        }
        if tag == "label" && wraps_form_control(tree, node) {
            return Some("label_wrap");
        }

        // Layer 2: handlers, tabindex, contenteditable
        if EVENT_HANDLER_ATTRIBUTES
            .iter()
            .any(|a| node.attributes.contains_key(*a))
        {
            return Some("event_handler");
        }
        if node
            .attr("tabindex")
            .and_then(|t| t.trim().parse::<i64>().ok())
            .is_some_and(|t| t >= 0)
        {
            return Some("tabindex");
        }
        if node
            .attr("contenteditable")
            .is_some_and(|v| v.is_empty() || v.eq_ignore_ascii_case("true"))
        {
            return Some("contenteditable");
        }

        // Layer 3: ARIA roles
        let role = node.role();
        if role.as_deref().is_some_and(|r| INTERACTIVE_ROLES.contains(&r))
            || node.ax_role().is_some_and(|r| INTERACTIVE_ROLES.contains(&r))
        {
            return Some("aria_role");
        }

        // Layer 4: accessibility states
        if TRUTHY_AX_PROPERTIES
            .iter()
            .any(|p| node.ax_property(p).is_some_and(is_truthy))
        {
            return Some("ax_focusable");
        }
        if STATE_AX_PROPERTIES
            .iter()
            .any(|p| node.ax_property(p).is_some_and(|v| !v.is_null()))
        {
            return Some("ax_state");
        }

        // Layer 5: layout hint
        if node.snapshot.as_ref().and_then(|s| s.is_clickable) == Some(true) {
            return Some("snapshot_clickable");
        }

        // Layer 6: cursor
        let cursor = node
            .snapshot
            .as_ref()
            .and_then(|s| s.cursor_style.as_deref())
            .or_else(|| node.computed_style("cursor"));
        if cursor.is_some_and(|c| c.trim().eq_ignore_ascii_case("pointer")) {
            return Some("cursor_pointer");
        }

        // Layer 7: sizeable iframes
        if tag == "iframe" || tag == "frame" {
            if let Some(bounds) = node.bounds() {
                if bounds.width > MIN_IFRAME_SIZE && bounds.height > MIN_IFRAME_SIZE {
                    return Some("iframe");
                }
            }
        }

        None
    }
}

impl InteractivityDetector for DefaultInteractivityDetector {
    fn is_interactive(&self, tree: &DomTree, node: &RawNode) -> bool {
        self.reason(tree, node).is_some()
    }
}

fn wraps_form_control(tree: &DomTree, label: &RawNode) -> bool {
    let mut stack: Vec<NodeId> = label.children.clone();
    while let Some(id) = stack.pop() {
        let node = &tree[id];
        if node.is_element() && LABELLED_CONTROL_TAGS.contains(&node.tag_name.as_str()) {
            return true;
        }
        stack.extend(node.children.iter().copied());
    }
    false
}

fn is_disabled(node: &RawNode) -> bool {
    node.attributes.contains_key("disabled")
        || node.ax_property("disabled").is_some_and(is_truthy)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

/// Per-call memo of detector answers keyed by CDP `node_id`.
pub(crate) struct InteractivityCache<'a> {
    detector: &'a dyn InteractivityDetector,
    cache: HashMap<i64, bool>,
}

impl<'a> InteractivityCache<'a> {
    pub(crate) fn new(detector: &'a dyn InteractivityDetector) -> Self {
        Self {
            detector,
            cache: HashMap::new(),
        }
    }

    pub(crate) fn is_interactive(&mut self, tree: &DomTree, id: NodeId) -> bool {
        let node = &tree[id];
        if let Some(&cached) = self.cache.get(&node.node_id) {
            return cached;
        }
        let interactive = self.detector.is_interactive(tree, node);
        if interactive {
            trace!(node_id = node.node_id, tag = %node.tag_name, "interactive");
        }
        self.cache.insert(node.node_id, interactive);
        interactive
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
#[path = "detector_tests.rs"]
mod tests;
