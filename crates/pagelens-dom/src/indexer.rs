//! Index assignment and new-element diffing.

use std::collections::HashSet;

use crate::serializer::SerializationContext;
use crate::state::{SelectorMap, SimplifiedNode};

/// Walks the filtered tree once, handing out indices from 1.
pub(crate) struct IndexAssigner {
    next_index: u32,
    previous_backend_ids: Option<HashSet<i64>>,
    selector_map: SelectorMap,
}

impl IndexAssigner {
    pub(crate) fn new(previous_backend_ids: Option<HashSet<i64>>) -> Self {
        Self {
            next_index: 1,
            previous_backend_ids,
            selector_map: SelectorMap::new(),
        }
    }

    pub(crate) fn assign(&mut self, ctx: &mut SerializationContext<'_>, node: &mut SimplifiedNode) {
        if !node.excluded_by_parent && ctx.is_interactive_visible(node.node_id) {
            let index = self.next_index;
            self.next_index += 1;

            node.interactive_index = Some(index);
            self.selector_map.insert(index, node.node_id);

            if let Some(previous) = &self.previous_backend_ids {
                let backend_node_id = ctx.tree[node.node_id].backend_node_id;
                node.is_new = !previous.contains(&backend_node_id);
            }
        }

        for child in &mut node.children {
            self.assign(ctx, child);
        }
    }

    pub(crate) fn into_selector_map(self) -> SelectorMap {
        self.selector_map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureNode;
    use crate::detector::DefaultInteractivityDetector;
    use crate::simplifier::simplify_tree;
    use crate::tree::DomTree;

    fn page() -> DomTree {
        let capture = CaptureNode::element(1, "body").with_children([
            CaptureNode::element(2, "button").with_backend_id(20),
            CaptureNode::element(3, "div")
                .with_child(CaptureNode::element(4, "input").with_backend_id(40)),
            CaptureNode::element(5, "a")
                .with_attr("href", "/next")
                .with_backend_id(50),
        ]);
        DomTree::from_capture(&capture).unwrap()
    }

    fn assign(tree: &DomTree, previous: Option<HashSet<i64>>) -> (SimplifiedNode, SelectorMap) {
        let detector = DefaultInteractivityDetector;
        let mut ctx = SerializationContext::new(tree, &detector);
        let mut root = simplify_tree(&mut ctx, tree.root()).unwrap();
        let mut assigner = IndexAssigner::new(previous);
        assigner.assign(&mut ctx, &mut root);
        (root, assigner.into_selector_map())
    }

    #[test]
    fn test_indices_follow_preorder() {
        let tree = page();
        let (_, map) = assign(&tree, None);
        assert_eq!(map.indices(), vec![1, 2, 3]);
        let tags: Vec<&str> = map
            .iter()
            .map(|(_, id)| tree[id].tag_name.as_str())
            .collect();
        assert_eq!(tags, vec!["button", "input", "a"]);
    }

    #[test]
    fn test_no_previous_means_nothing_new() {
        let tree = page();
        let (root, _) = assign(&tree, None);
        assert!(root.walk().iter().all(|n| !n.is_new));
    }

    #[test]
    fn test_is_new_by_backend_id() {
        let tree = page();
        let previous: HashSet<i64> = [20, 50].into_iter().collect();
        let (root, _) = assign(&tree, Some(previous));

        let new_tags: Vec<&str> = root
            .walk()
            .into_iter()
            .filter(|n| n.is_new)
            .map(|n| tree[n.node_id].tag_name.as_str())
            .collect();
        assert_eq!(new_tags, vec!["input"]);
    }

    #[test]
    fn test_excluded_node_skipped_but_children_indexed() {
        let tree = page();
        let detector = DefaultInteractivityDetector;
        let mut ctx = SerializationContext::new(&tree, &detector);
        let mut root = simplify_tree(&mut ctx, tree.root()).unwrap();
        root.children[0].excluded_by_parent = true;

        let mut assigner = IndexAssigner::new(None);
        assigner.assign(&mut ctx, &mut root);
        let map = assigner.into_selector_map();

        assert_eq!(map.len(), 2);
        assert_eq!(root.children[0].interactive_index, None);
        assert_eq!(root.children[1].children[0].interactive_index, Some(1));
    }
}
