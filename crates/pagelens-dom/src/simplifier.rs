//! First pruning pass: raw tree to simplified tree.

use crate::geometry::is_actually_scrollable;
use crate::serializer::SerializationContext;
use crate::state::SimplifiedNode;
use crate::tree::{NodeId, NodeType};

/// Elements that never carry page content.
const DISABLED_ELEMENTS: &[&str] = &["style", "script", "head", "meta", "link", "title"];

/// Build the simplified subtree rooted at `id`, or `None` if nothing in it is
/// worth showing.
pub(crate) fn simplify_tree(ctx: &mut SerializationContext<'_>, id: NodeId) -> Option<SimplifiedNode> {
    let tree = ctx.tree;
    let node = &tree[id];

    match node.node_type {
        // One meaningful root per document
        NodeType::Document => tree
            .children_and_shadow_roots(id)
            .find_map(|child| simplify_tree(ctx, child)),

        NodeType::DocumentFragment => {
            let children = simplify_children(ctx, id);
            Some(SimplifiedNode::with_children(id, children))
        }

        NodeType::Element => {
            if DISABLED_ELEMENTS.contains(&node.tag_name.as_str()) {
                return None;
            }

            if node.tag_name == "iframe" {
                if let Some(document) = node.content_document {
                    let children = simplify_children(ctx, document);
                    return Some(SimplifiedNode::with_children(id, children));
                }
            }

            let interactive = ctx.is_interactive_visible(id);
            let scrollable = is_actually_scrollable(node);
            let children = simplify_children(ctx, id);

            if interactive || scrollable || !children.is_empty() {
                Some(SimplifiedNode::with_children(id, children))
            } else {
                None
            }
        }

        NodeType::Text => {
            let significant = node.node_value.trim().chars().count() > 1;
            (node.is_visible() && significant).then(|| SimplifiedNode::new(id))
        }

        _ => None,
    }
}

fn simplify_children(ctx: &mut SerializationContext<'_>, id: NodeId) -> Vec<SimplifiedNode> {
    let tree = ctx.tree;
    tree.children_and_shadow_roots(id)
        .filter_map(|child| simplify_tree(ctx, child))
        .collect()
}

#[cfg(test)]
#[path = "simplifier_tests.rs"]
mod tests;
