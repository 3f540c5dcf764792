//! Second pruning pass: drop branches emptied by simplification.

use crate::geometry::is_actually_scrollable;
use crate::serializer::SerializationContext;
use crate::state::SimplifiedNode;

/// Rebuild `node` bottom-up, keeping it only if it is actionable, scrollable,
/// text, or still has children.
pub(crate) fn optimize_tree(
    ctx: &mut SerializationContext<'_>,
    mut node: SimplifiedNode,
) -> Option<SimplifiedNode> {
    let children = std::mem::take(&mut node.children);
    node.children = children
        .into_iter()
        .filter_map(|child| optimize_tree(ctx, child))
        .collect();

    let tree = ctx.tree;
    let raw = &tree[node.node_id];
    let keep = ctx.is_interactive_visible(node.node_id)
        || is_actually_scrollable(raw)
        || raw.is_text()
        || !node.children.is_empty();

    keep.then_some(node)
}
