//! Scrollability, scroll progress and XPath helpers.
//!
//! Every function here treats missing geometry or style data as the most
//! conservative answer: not scrollable, no scroll info.

use serde::Serialize;

use crate::tree::{DomTree, NodeId, NodeType, RawNode};

/// Tags allowed to count as scrollable when no overflow style is known.
const SCROLLABLE_TAGS: &[&str] = &["div", "main", "section", "article", "aside", "body", "html"];

/// Overflow values that produce a scrollbar.
const SCROLLING_OVERFLOW: &[&str] = &["auto", "scroll", "overlay"];

const OVERFLOW_STYLES: &[&str] = &["overflow", "overflow-x", "overflow-y"];

/// Scroll position of a scrollable element, in CSS pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollInfo {
    pub scroll_top: f64,
    pub scroll_left: f64,
    pub scrollable_height: f64,
    pub scrollable_width: f64,
    pub visible_height: f64,
    pub visible_width: f64,
    pub content_above: f64,
    pub content_below: f64,
    pub content_left: f64,
    pub content_right: f64,
    pub vertical_scroll_percentage: f64,
    pub horizontal_scroll_percentage: f64,
    pub pages_above: f64,
    pub pages_below: f64,
    pub total_pages: f64,
}

/// Whether the element can really be scrolled by the user.
pub fn is_actually_scrollable(node: &RawNode) -> bool {
    if node.is_scrollable == Some(true) {
        return true;
    }
    if !node.is_element() {
        return false;
    }

    let Some(snapshot) = &node.snapshot else {
        return false;
    };
    let (Some(scroll), Some(client)) = (&snapshot.scroll_rects, &snapshot.client_rects) else {
        return false;
    };

    let overflows =
        scroll.height > client.height + 1.0 || scroll.width > client.width + 1.0;
    if !overflows {
        return false;
    }

    let overflow_values: Vec<String> = OVERFLOW_STYLES
        .iter()
        .filter_map(|name| snapshot.computed_styles.get(*name))
        .map(|v| v.trim().to_ascii_lowercase())
        .collect();

    if overflow_values.is_empty() {
        SCROLLABLE_TAGS.contains(&node.tag_name.as_str())
    } else {
        overflow_values
            .iter()
            .any(|v| SCROLLING_OVERFLOW.contains(&v.as_str()))
    }
}

/// Scroll statistics, or `None` when the node is not scrollable or lacks
/// geometry.
pub fn scroll_info(node: &RawNode) -> Option<ScrollInfo> {
    if !is_actually_scrollable(node) {
        return None;
    }
    let snapshot = node.snapshot.as_ref()?;
    let scroll = snapshot.scroll_rects.as_ref()?;
    let client = snapshot.client_rects.as_ref()?;

    let scroll_top = scroll.y.max(0.0);
    let scroll_left = scroll.x.max(0.0);
    let scrollable_height = scroll.height.max(0.0);
    let scrollable_width = scroll.width.max(0.0);
    let visible_height = client.height.max(0.0);
    let visible_width = client.width.max(0.0);

    let content_above = scroll_top;
    let content_below = (scrollable_height - visible_height - scroll_top).max(0.0);
    let content_left = scroll_left;
    let content_right = (scrollable_width - visible_width - scroll_left).max(0.0);

    let vertical_scroll_percentage = percentage(scroll_top, scrollable_height - visible_height);
    let horizontal_scroll_percentage = percentage(scroll_left, scrollable_width - visible_width);

    let (pages_above, pages_below, total_pages) = if visible_height > 0.0 {
        (
            round1(content_above / visible_height),
            round1(content_below / visible_height),
            round1(scrollable_height / visible_height),
        )
    } else {
        (0.0, 0.0, 0.0)
    };

    Some(ScrollInfo {
        scroll_top,
        scroll_left,
        scrollable_height,
        scrollable_width,
        visible_height,
        visible_width,
        content_above,
        content_below,
        content_left,
        content_right,
        vertical_scroll_percentage,
        horizontal_scroll_percentage,
        pages_above,
        pages_below,
        total_pages,
    })
}

fn percentage(offset: f64, range: f64) -> f64 {
    if range <= 0.0 {
        return 0.0;
    }
    round1((offset / range * 100.0).clamp(0.0, 100.0))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// XPath of an element relative to its document (or iframe document).
///
/// Shadow roots are skipped; same-tag siblings get a 1-based position.
pub fn generate_xpath(tree: &DomTree, id: NodeId) -> String {
    let mut segments = Vec::new();
    let mut current = Some(id);

    while let Some(node_id) = current {
        let node = &tree[node_id];
        match node.node_type {
            NodeType::DocumentFragment => {
                current = node.parent;
                continue;
            }
            NodeType::Element => {}
            _ => break,
        }

        match sibling_position(tree, node_id) {
            Some(position) => segments.push(format!("{}[{}]", node.tag_name, position)),
            None => segments.push(node.tag_name.clone()),
        }

        current = node.parent;
        if let Some(parent) = current {
            if tree[parent].is_element() && tree[parent].tag_name == "iframe" {
                break;
            }
        }
    }

    segments.reverse();
    segments.join("/")
}

/// 1-based position among same-tag element siblings, when there is more than one.
fn sibling_position(tree: &DomTree, id: NodeId) -> Option<usize> {
    let node = &tree[id];
    let parent = node.parent?;
    let same_tag: Vec<NodeId> = tree[parent]
        .children
        .iter()
        .copied()
        .filter(|&c| tree[c].is_element() && tree[c].tag_name == node.tag_name)
        .collect();

    if same_tag.len() <= 1 {
        return None;
    }
    same_tag.iter().position(|&c| c == id).map(|p| p + 1)
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
