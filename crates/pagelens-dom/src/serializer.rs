//! The serialization pipeline: simplify, optimize, filter, index.

use std::sync::Arc;
use std::time::Instant;

use pagelens_config::SerializerConfig;
use tracing::debug;

use crate::bbox::BoundingBoxFilter;
use crate::detector::{DefaultInteractivityDetector, InteractivityCache, InteractivityDetector};
use crate::indexer::IndexAssigner;
use crate::optimizer::optimize_tree;
use crate::simplifier::simplify_tree;
use crate::state::{SerializedDomState, SimplifiedNode};
use crate::tree::{DomTree, NodeId};

/// Working state of one serialization call.
pub(crate) struct SerializationContext<'a> {
    pub(crate) tree: &'a DomTree,
    interactivity: InteractivityCache<'a>,
}

impl<'a> SerializationContext<'a> {
    pub(crate) fn new(tree: &'a DomTree, detector: &'a dyn InteractivityDetector) -> Self {
        Self {
            tree,
            interactivity: InteractivityCache::new(detector),
        }
    }

    /// Interactive per the detector and currently visible.
    pub(crate) fn is_interactive_visible(&mut self, id: NodeId) -> bool {
        self.tree[id].is_visible() && self.interactivity.is_interactive(self.tree, id)
    }
}

/// Turns a captured [`DomTree`] into a [`SerializedDomState`].
///
/// Holds no per-call state, so one instance can serve any number of pages
/// and threads.
#[derive(Clone)]
pub struct DomTreeSerializer {
    config: SerializerConfig,
    detector: Arc<dyn InteractivityDetector>,
}

impl DomTreeSerializer {
    pub fn new(config: SerializerConfig) -> Self {
        Self::with_detector(config, Arc::new(DefaultInteractivityDetector))
    }

    pub fn with_detector(config: SerializerConfig, detector: Arc<dyn InteractivityDetector>) -> Self {
        Self { config, detector }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Run the full pipeline over `tree`.
    ///
    /// `previous` is only used to flag elements whose backend node id was not
    /// indexed last time.
    pub fn serialize(
        &self,
        mut tree: DomTree,
        previous: Option<&SerializedDomState>,
    ) -> SerializedDomState {
        let started = Instant::now();
        tree.clear_element_indices();
        let previous_backend_ids = previous.map(|p| p.backend_node_ids());

        let (root, selector_map) = {
            let mut ctx = SerializationContext::new(&tree, self.detector.as_ref());

            let simplified = simplify_tree(&mut ctx, tree.root());
            debug!(
                nodes = simplified.as_ref().map_or(0, count_nodes),
                "Simplified DOM tree"
            );

            let mut root = simplified.and_then(|node| optimize_tree(&mut ctx, node));
            debug!(nodes = root.as_ref().map_or(0, count_nodes), "Optimized DOM tree");

            if self.config.enable_bbox_filtering {
                if let Some(root) = root.as_mut() {
                    let filter = BoundingBoxFilter::new(self.config.containment_threshold);
                    let excluded = filter.apply(&tree, root);
                    debug!(excluded, "Applied bounding box filter");
                }
            }

            let mut assigner = IndexAssigner::new(previous_backend_ids);
            if let Some(root) = root.as_mut() {
                assigner.assign(&mut ctx, root);
            }
            (root, assigner.into_selector_map())
        };

        for (index, id) in selector_map.iter() {
            tree.stamp_element_index(id, index);
        }

        debug!(
            interactive = selector_map.len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Serialized DOM tree"
        );

        SerializedDomState::new(
            tree,
            root,
            selector_map,
            self.config.include_attributes.clone(),
        )
    }
}

impl Default for DomTreeSerializer {
    fn default() -> Self {
        Self::new(SerializerConfig::default())
    }
}

fn count_nodes(node: &SimplifiedNode) -> usize {
    1 + node.children.iter().map(count_nodes).sum::<usize>()
}

#[cfg(test)]
#[path = "serializer_tests.rs"]
mod tests;
