//! Arena-backed raw DOM tree merged from the DOM, accessibility and snapshot captures.

use std::collections::HashMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Slot of a node inside its [`DomTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Node type matching the DOM specification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Element,
    Attribute,
    Text,
    CdataSection,
    ProcessingInstruction,
    Comment,
    Document,
    DocumentType,
    DocumentFragment,
}

impl NodeType {
    /// Map a CDP `nodeType` code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(NodeType::Element),
            2 => Some(NodeType::Attribute),
            3 => Some(NodeType::Text),
            4 => Some(NodeType::CdataSection),
            7 => Some(NodeType::ProcessingInstruction),
            8 => Some(NodeType::Comment),
            9 => Some(NodeType::Document),
            10 => Some(NodeType::DocumentType),
            11 => Some(NodeType::DocumentFragment),
            _ => None,
        }
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Check if this box intersects with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Area of the overlap with `other`, zero when disjoint.
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);

        if right <= left || bottom <= top {
            return 0.0;
        }
        (right - left) * (bottom - top)
    }
}

/// Layout data from `DOMSnapshot.captureSnapshot`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    /// Clickability hint from the layout tree.
    #[serde(default)]
    pub is_clickable: Option<bool>,
    #[serde(default)]
    pub cursor_style: Option<String>,
    /// Document coordinates.
    #[serde(default)]
    pub bounds: Option<Rect>,
    /// Viewport of the element's scrollport.
    #[serde(default)]
    pub client_rects: Option<Rect>,
    /// Full scrollable content area; `x`/`y` carry the scroll offsets.
    #[serde(default)]
    pub scroll_rects: Option<Rect>,
    #[serde(default)]
    pub computed_styles: HashMap<String, String>,
    #[serde(default)]
    pub paint_order: Option<i64>,
}

/// Accessibility property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxProperty {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

/// Accessibility node data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AxNode {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub properties: Vec<AxProperty>,
}

/// One merged DOM/accessibility/layout record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawNode {
    /// Session-scoped CDP node id.
    pub node_id: i64,
    /// Identity stable for the page lifetime.
    pub backend_node_id: i64,
    pub node_type: NodeType,
    /// Name as reported by CDP (`DIV`, `#text`, ...).
    pub node_name: String,
    /// Lower-cased `node_name`.
    pub tag_name: String,
    /// Text content for text nodes.
    pub node_value: String,
    pub attributes: HashMap<String, String>,
    pub is_visible: Option<bool>,
    pub is_scrollable: Option<bool>,
    pub snapshot: Option<SnapshotNode>,
    pub ax: Option<AxNode>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub shadow_roots: Vec<NodeId>,
    pub content_document: Option<NodeId>,
    /// Index published in the latest selector map.
    pub element_index: Option<u32>,
}

impl RawNode {
    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Missing visibility data counts as hidden.
    pub fn is_visible(&self) -> bool {
        self.is_visible.unwrap_or(false)
    }

    /// Get attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(|s| s.as_str())
    }

    /// Explicit ARIA `role` attribute, lower-cased and trimmed.
    pub fn role(&self) -> Option<String> {
        self.attr("role")
            .map(|r| r.trim().to_ascii_lowercase())
            .filter(|r| !r.is_empty())
    }

    /// Document-space bounds from the layout snapshot.
    pub fn bounds(&self) -> Option<&Rect> {
        self.snapshot.as_ref().and_then(|s| s.bounds.as_ref())
    }

    pub fn ax_role(&self) -> Option<&str> {
        self.ax.as_ref().and_then(|ax| ax.role.as_deref())
    }

    pub fn ax_name(&self) -> Option<&str> {
        self.ax.as_ref().and_then(|ax| ax.name.as_deref())
    }

    /// Look up an accessibility property by name.
    pub fn ax_property(&self, name: &str) -> Option<&Value> {
        self.ax
            .as_ref()
            .and_then(|ax| ax.properties.iter().find(|p| p.name == name))
            .map(|p| &p.value)
    }

    pub fn computed_style(&self, name: &str) -> Option<&str> {
        self.snapshot
            .as_ref()
            .and_then(|s| s.computed_styles.get(name))
            .map(|s| s.as_str())
    }
}

/// Raw node tree for one capture, stored as an arena.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomTree {
    pub(crate) nodes: Vec<RawNode>,
    pub(crate) root: NodeId,
}

impl DomTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&RawNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in ingest (pre-order) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &RawNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Find a node by its CDP node id.
    pub fn find_by_node_id(&self, node_id: i64) -> Option<NodeId> {
        self.iter().find(|(_, n)| n.node_id == node_id).map(|(id, _)| id)
    }

    /// Children followed by shadow roots.
    pub fn children_and_shadow_roots(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let node = &self[id];
        node.children.iter().chain(node.shadow_roots.iter()).copied()
    }

    /// The `<html>` element of an iframe's content document.
    pub fn iframe_html(&self, iframe: NodeId) -> Option<NodeId> {
        let document = self[iframe].content_document?;
        self[document]
            .children
            .iter()
            .copied()
            .find(|&c| self[c].is_element() && self[c].tag_name == "html")
    }

    pub(crate) fn clear_element_indices(&mut self) {
        for node in &mut self.nodes {
            node.element_index = None;
        }
    }

    pub(crate) fn stamp_element_index(&mut self, id: NodeId, index: u32) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.element_index = Some(index);
        }
    }
}

impl Index<NodeId> for DomTree {
    type Output = RawNode;

    fn index(&self, id: NodeId) -> &RawNode {
        &self.nodes[id.0]
    }
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
