//! Capture ingest: nested CDP-shaped nodes flattened into a [`DomTree`].
//!
//! The capture collaborator merges `DOM.getDocument`, the full accessibility
//! tree and `DOMSnapshot.captureSnapshot` into one nested document. This module
//! validates it once and lays it out as an arena, so later passes never
//! re-check structure.

use std::collections::{HashMap, HashSet};
use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::DomError;
use crate::tree::{AxNode, AxProperty, DomTree, NodeId, NodeType, RawNode, Rect, SnapshotNode};

/// Deepest nesting accepted from a capture.
///
/// Each level costs two JSON containers (the node and its `children` array),
/// so any capture within this depth also fits serde_json's default recursion
/// limit of 128 with room for snapshot and AX payloads.
pub const MAX_CAPTURE_DEPTH: usize = 60;

/// Capture node as produced by the CDP capture collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureNode {
    pub node_id: i64,
    #[serde(default)]
    pub backend_node_id: i64,
    pub node_type: i64,
    pub node_name: String,
    #[serde(default)]
    pub node_value: Option<String>,
    /// Flat `[name, value, name, value, ...]` list, as in `DOM.getDocument`.
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub children: Vec<CaptureNode>,
    #[serde(default)]
    pub shadow_roots: Vec<CaptureNode>,
    #[serde(default)]
    pub content_document: Option<Box<CaptureNode>>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub is_scrollable: Option<bool>,
    #[serde(default)]
    pub snapshot: Option<SnapshotNode>,
    #[serde(default)]
    pub ax: Option<AxNode>,
}

impl CaptureNode {
    fn bare(node_id: i64, node_type: i64, node_name: &str) -> Self {
        Self {
            node_id,
            backend_node_id: node_id,
            node_type,
            node_name: node_name.to_string(),
            node_value: None,
            attributes: Vec::new(),
            children: Vec::new(),
            shadow_roots: Vec::new(),
            content_document: None,
            is_visible: None,
            is_scrollable: None,
            snapshot: None,
            ax: None,
        }
    }

    /// A `#document` node.
    pub fn document(node_id: i64) -> Self {
        Self::bare(node_id, 9, "#document")
    }

    /// A shadow root.
    pub fn fragment(node_id: i64) -> Self {
        Self::bare(node_id, 11, "#document-fragment")
    }

    /// A visible element with the given tag.
    pub fn element(node_id: i64, tag: &str) -> Self {
        let mut node = Self::bare(node_id, 1, &tag.to_ascii_uppercase());
        node.is_visible = Some(true);
        node
    }

    /// A visible text node.
    pub fn text(node_id: i64, value: &str) -> Self {
        let mut node = Self::bare(node_id, 3, "#text");
        node.node_value = Some(value.to_string());
        node.is_visible = Some(true);
        node
    }

    pub fn comment(node_id: i64, value: &str) -> Self {
        let mut node = Self::bare(node_id, 8, "#comment");
        node.node_value = Some(value.to_string());
        node
    }

    pub fn with_backend_id(mut self, backend_node_id: i64) -> Self {
        self.backend_node_id = backend_node_id;
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push(name.to_string());
        self.attributes.push(value.to_string());
        self
    }

    pub fn with_child(mut self, child: CaptureNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = CaptureNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_shadow_root(mut self, root: CaptureNode) -> Self {
        self.shadow_roots.push(root);
        self
    }

    pub fn with_content_document(mut self, document: CaptureNode) -> Self {
        self.content_document = Some(Box::new(document));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = Some(false);
        self
    }

    pub fn scrollable(mut self, scrollable: bool) -> Self {
        self.is_scrollable = Some(scrollable);
        self
    }

    pub fn with_bounds(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.snapshot_mut().bounds = Some(Rect::new(x, y, width, height));
        self
    }

    /// Set the scrollport (`client`) and content (`scroll`) rectangles.
    pub fn with_scroll_rects(mut self, client: Rect, scroll: Rect) -> Self {
        let snapshot = self.snapshot_mut();
        snapshot.client_rects = Some(client);
        snapshot.scroll_rects = Some(scroll);
        self
    }

    pub fn with_style(mut self, name: &str, value: &str) -> Self {
        self.snapshot_mut()
            .computed_styles
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_cursor(mut self, cursor: &str) -> Self {
        self.snapshot_mut().cursor_style = Some(cursor.to_string());
        self
    }

    pub fn with_clickable_hint(mut self, clickable: bool) -> Self {
        self.snapshot_mut().is_clickable = Some(clickable);
        self
    }

    pub fn with_ax_role(mut self, role: &str) -> Self {
        self.ax_mut().role = Some(role.to_string());
        self
    }

    pub fn with_ax_name(mut self, name: &str) -> Self {
        self.ax_mut().name = Some(name.to_string());
        self
    }

    pub fn with_ax_property(mut self, name: &str, value: serde_json::Value) -> Self {
        self.ax_mut().properties.push(AxProperty {
            name: name.to_string(),
            value,
        });
        self
    }

    fn snapshot_mut(&mut self) -> &mut SnapshotNode {
        self.snapshot.get_or_insert_with(SnapshotNode::default)
    }

    fn ax_mut(&mut self) -> &mut AxNode {
        self.ax.get_or_insert_with(AxNode::default)
    }
}

impl DomTree {
    /// Validate a capture and lay it out as an arena in pre-order.
    pub fn from_capture(root: &CaptureNode) -> Result<Self, DomError> {
        let mut builder = ArenaBuilder::default();
        let root = check_depth(root)
            .and_then(|()| builder.push(root, None))
            .inspect_err(|e| {
                warn!("Rejected DOM capture: {}", e);
            })?;
        Ok(DomTree {
            nodes: builder.nodes,
            root,
        })
    }

    /// Parse and ingest a JSON capture.
    ///
    /// JSON nested past serde_json's recursion limit fails as
    /// [`DomError::Json`] before any node is built.
    pub fn from_json(json: &str) -> Result<Self, DomError> {
        let capture: CaptureNode = serde_json::from_str(json).inspect_err(|e| {
            warn!("Unparseable DOM capture: {}", e);
        })?;
        Self::from_capture(&capture)
    }

    /// Parse and ingest a JSON capture from a reader.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, DomError> {
        let mut json = String::new();
        reader.read_to_string(&mut json)?;
        Self::from_json(&json)
    }
}

#[derive(Default)]
struct ArenaBuilder {
    nodes: Vec<RawNode>,
    seen: HashSet<i64>,
}

impl ArenaBuilder {
    fn push(&mut self, capture: &CaptureNode, parent: Option<NodeId>) -> Result<NodeId, DomError> {
        if !self.seen.insert(capture.node_id) {
            return Err(DomError::DuplicateNodeId(capture.node_id));
        }
        let node_type =
            NodeType::from_code(capture.node_type).ok_or(DomError::UnknownNodeType {
                node_id: capture.node_id,
                code: capture.node_type,
            })?;
        if capture.attributes.len() % 2 != 0 {
            return Err(DomError::MalformedAttributes(capture.node_id));
        }

        let attributes: HashMap<String, String> = capture
            .attributes
            .chunks_exact(2)
            .map(|pair| (pair[0].to_ascii_lowercase(), pair[1].clone()))
            .collect();

        let id = NodeId(self.nodes.len());
        self.nodes.push(RawNode {
            node_id: capture.node_id,
            backend_node_id: capture.backend_node_id,
            node_type,
            node_name: capture.node_name.clone(),
            tag_name: capture.node_name.to_ascii_lowercase(),
            node_value: capture.node_value.clone().unwrap_or_default(),
            attributes,
            is_visible: capture.is_visible,
            is_scrollable: capture.is_scrollable,
            snapshot: capture.snapshot.clone(),
            ax: capture.ax.clone(),
            parent,
            children: Vec::new(),
            shadow_roots: Vec::new(),
            content_document: None,
            element_index: None,
        });

        for child in &capture.children {
            let child_id = self.push(child, Some(id))?;
            self.nodes[id.0].children.push(child_id);
        }
        for shadow_root in &capture.shadow_roots {
            let root_id = self.push(shadow_root, Some(id))?;
            self.nodes[id.0].shadow_roots.push(root_id);
        }
        if let Some(document) = &capture.content_document {
            let document_id = self.push(document, Some(id))?;
            self.nodes[id.0].content_document = Some(document_id);
        }

        Ok(id)
    }
}

/// Reject over-deep captures before any recursive pass touches them.
fn check_depth(root: &CaptureNode) -> Result<(), DomError> {
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if depth > MAX_CAPTURE_DEPTH {
            return Err(DomError::TooDeep(MAX_CAPTURE_DEPTH));
        }
        let nested = node
            .children
            .iter()
            .chain(node.shadow_roots.iter())
            .chain(node.content_document.as_deref());
        stack.extend(nested.map(|child| (child, depth + 1)));
    }
    Ok(())
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
