//! Pipeline output: simplified tree, selector map and serialized state.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::geometry::generate_xpath;
use crate::text::TextSerializer;
use crate::tree::{DomTree, NodeId, RawNode};

/// Node of the pruned tree handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplifiedNode {
    pub node_id: NodeId,
    pub children: Vec<SimplifiedNode>,
    pub should_display: bool,
    pub interactive_index: Option<u32>,
    pub is_new: bool,
    /// Collapsed into an enclosing clickable container.
    pub excluded_by_parent: bool,
}

impl SimplifiedNode {
    pub fn new(node_id: NodeId) -> Self {
        Self::with_children(node_id, Vec::new())
    }

    pub fn with_children(node_id: NodeId, children: Vec<SimplifiedNode>) -> Self {
        Self {
            node_id,
            children,
            should_display: true,
            interactive_index: None,
            is_new: false,
            excluded_by_parent: false,
        }
    }

    /// Pre-order walk over this node and its descendants.
    pub fn walk(&self) -> Vec<&SimplifiedNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }
}

/// Index to element lookup used by the action layer.
///
/// Indices start at 1 and follow pre-order traversal of the filtered tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectorMap {
    entries: BTreeMap<u32, NodeId>,
}

impl SelectorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, index: u32, node: NodeId) {
        self.entries.insert(index, node);
    }

    pub fn get(&self, index: u32) -> Option<NodeId> {
        self.entries.get(&index).copied()
    }

    pub fn contains(&self, index: u32) -> bool {
        self.entries.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, NodeId)> + '_ {
        self.entries.iter().map(|(&i, &n)| (i, n))
    }

    pub fn indices(&self) -> Vec<u32> {
        self.entries.keys().copied().collect()
    }
}

/// Result of one serialization call.
#[derive(Debug, Clone)]
pub struct SerializedDomState {
    tree: DomTree,
    pub root: Option<SimplifiedNode>,
    pub selector_map: SelectorMap,
    include_attributes: Vec<String>,
}

impl SerializedDomState {
    pub(crate) fn new(
        tree: DomTree,
        root: Option<SimplifiedNode>,
        selector_map: SelectorMap,
        include_attributes: Vec<String>,
    ) -> Self {
        Self {
            tree,
            root,
            selector_map,
            include_attributes,
        }
    }

    /// The raw tree, with `element_index` stamped on indexed nodes.
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    pub fn into_tree(self) -> DomTree {
        self.tree
    }

    /// Resolve a model-chosen index to its element.
    pub fn element(&self, index: u32) -> Option<&RawNode> {
        self.selector_map.get(index).and_then(|id| self.tree.get(id))
    }

    /// XPath of the element behind `index`.
    pub fn xpath(&self, index: u32) -> Option<String> {
        self.selector_map
            .get(index)
            .map(|id| generate_xpath(&self.tree, id))
    }

    /// Backend node ids of every indexed element.
    pub fn backend_node_ids(&self) -> HashSet<i64> {
        self.selector_map
            .iter()
            .filter_map(|(_, id)| self.tree.get(id))
            .map(|n| n.backend_node_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.selector_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selector_map.is_empty()
    }

    /// Text rendering for the model prompt.
    ///
    /// `include_attributes` overrides the configured allow-list.
    pub fn llm_representation(&self, include_attributes: Option<&[String]>) -> String {
        let attributes = include_attributes.unwrap_or(&self.include_attributes);
        TextSerializer::new(&self.tree, attributes).serialize(self.root.as_ref())
    }
}
