//! Plain-text rendering of the filtered tree for the model prompt.
//!
//! ```text
//! [1]<a href=... />
//! |SCROLL|<div /> (2.0↑ 1.0↓ 66.7%)
//! 	*[2]<button>Buy</button>
//! 	Some paragraph text
//! ```

use std::collections::HashSet;

use serde_json::Value;

use crate::geometry::{is_actually_scrollable, scroll_info, ScrollInfo};
use crate::state::SimplifiedNode;
use crate::tree::{DomTree, NodeType, RawNode};

/// Rendering of a tree with no root, i.e. a page that has not loaded yet.
pub const EMPTY_DOM_TREE: &str = "Empty DOM tree (you might have to wait for the page to load)";

const MAX_ATTRIBUTE_LENGTH: usize = 100;

/// Values up to this length may repeat across attributes.
const DEDUP_MIN_LENGTH: usize = 5;

/// Attributes dropped when they only repeat the element's own text.
const TEXT_ECHO_ATTRIBUTES: &[&str] = &["aria-label", "placeholder", "title", "ax_name"];

enum Line {
    Transparent,
    Text(String),
    Element { prefix: String },
}

/// Renders a [`SimplifiedNode`] tree against its raw [`DomTree`].
pub struct TextSerializer<'a> {
    tree: &'a DomTree,
    include_attributes: &'a [String],
}

impl<'a> TextSerializer<'a> {
    pub fn new(tree: &'a DomTree, include_attributes: &'a [String]) -> Self {
        Self {
            tree,
            include_attributes,
        }
    }

    pub fn serialize(&self, root: Option<&SimplifiedNode>) -> String {
        let Some(root) = root else {
            return EMPTY_DOM_TREE.to_string();
        };
        let mut lines = Vec::new();
        self.render(root, 0, &mut lines);
        lines.join("\n")
    }

    fn render(&self, node: &SimplifiedNode, depth: usize, out: &mut Vec<String>) {
        match self.line(node) {
            Line::Transparent => {
                for child in &node.children {
                    self.render(child, depth, out);
                }
            }
            Line::Text(text) => out.push(format!("{}{}", "\t".repeat(depth), text)),
            Line::Element { prefix } => {
                let raw = &self.tree[node.node_id];
                let mut items = Vec::new();
                self.collect_line_nodes(node, &mut items);

                let inline_text = self.inline_text(&items);
                let attributes = self.build_attributes(raw, inline_text.as_deref());

                let mut line = format!("{}{}<{}", "\t".repeat(depth), prefix, raw.tag_name);
                if !attributes.is_empty() {
                    line.push(' ');
                    line.push_str(&attributes);
                }
                match &inline_text {
                    Some(text) => line.push_str(&format!(">{}</{}>", text, raw.tag_name)),
                    None => line.push_str(" />"),
                }
                if let Some(info) = self.scroll_summary(node) {
                    line.push_str(&format!(
                        " ({:.1}↑ {:.1}↓ {:.1}%)",
                        info.pages_above, info.pages_below, info.vertical_scroll_percentage
                    ));
                }
                out.push(line);

                if inline_text.is_none() {
                    for item in items {
                        self.render(item, depth + 1, out);
                    }
                }
            }
        }
    }

    fn line(&self, node: &SimplifiedNode) -> Line {
        if node.excluded_by_parent || !node.should_display {
            return Line::Transparent;
        }
        let raw = &self.tree[node.node_id];

        match raw.node_type {
            NodeType::Text => Line::Text(collapse_whitespace(&raw.node_value)),
            NodeType::Element => {
                let scrollable = is_actually_scrollable(raw) && !self.is_iframe_html(raw);
                let prefix = match node.interactive_index {
                    Some(index) => {
                        let marker = if node.is_new { "*" } else { "" };
                        if scrollable {
                            format!("{}|SCROLL+{}]", marker, index)
                        } else {
                            format!("{}[{}]", marker, index)
                        }
                    }
                    None if scrollable => "|SCROLL|".to_string(),
                    None if raw.tag_name == "iframe" => "|IFRAME|".to_string(),
                    None if self.has_display_attributes(raw) => String::new(),
                    None => return Line::Transparent,
                };
                Line::Element { prefix }
            }
            _ => Line::Transparent,
        }
    }

    /// Nearest descendants that produce their own line.
    fn collect_line_nodes<'n>(&self, node: &'n SimplifiedNode, out: &mut Vec<&'n SimplifiedNode>) {
        for child in &node.children {
            match self.line(child) {
                Line::Transparent => self.collect_line_nodes(child, out),
                _ => out.push(child),
            }
        }
    }

    /// Joined text when every line below the element is a text node.
    fn inline_text(&self, items: &[&SimplifiedNode]) -> Option<String> {
        if items.is_empty() {
            return None;
        }
        let mut texts = Vec::with_capacity(items.len());
        for item in items {
            let raw = &self.tree[item.node_id];
            if !raw.is_text() {
                return None;
            }
            texts.push(collapse_whitespace(&raw.node_value));
        }
        Some(texts.join(" "))
    }

    fn scroll_summary(&self, node: &SimplifiedNode) -> Option<ScrollInfo> {
        let raw = &self.tree[node.node_id];
        if raw.tag_name == "iframe" {
            let html = self.tree.iframe_html(node.node_id)?;
            return scroll_info(&self.tree[html]);
        }
        scroll_info(raw)
    }

    /// `<html>` of an iframe document; its scroll summary goes on the iframe line.
    fn is_iframe_html(&self, raw: &RawNode) -> bool {
        raw.tag_name == "html"
            && raw
                .parent
                .and_then(|document| self.tree[document].parent)
                .is_some_and(|host| self.tree[host].tag_name == "iframe")
    }

    fn has_display_attributes(&self, raw: &RawNode) -> bool {
        self.include_attributes.iter().any(|name| {
            attribute_value(raw, name).is_some_and(|value| {
                !(name == "role" && value.eq_ignore_ascii_case(&raw.tag_name))
            })
        })
    }

    /// Curated `name=value` pairs for an element line.
    pub fn build_attributes(&self, raw: &RawNode, own_text: Option<&str>) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        let mut seen_values: HashSet<String> = HashSet::new();

        for name in self.include_attributes {
            let Some(value) = attribute_value(raw, name) else {
                continue;
            };
            if value.chars().count() > DEDUP_MIN_LENGTH && !seen_values.insert(value.clone()) {
                continue;
            }
            pairs.push((name.as_str(), value));
        }

        let own_text = own_text.map(|t| t.to_lowercase());
        pairs.retain(|(name, value)| {
            if *name == "role" && value.eq_ignore_ascii_case(&raw.tag_name) {
                return false;
            }
            if TEXT_ECHO_ATTRIBUTES.contains(name) {
                if let Some(text) = &own_text {
                    if value.to_lowercase() == *text {
                        return false;
                    }
                }
            }
            true
        });

        pairs
            .into_iter()
            .map(|(name, value)| format!("{}={}", name, cap_text(&value, MAX_ATTRIBUTE_LENGTH)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// HTML attribute, falling back to accessibility data (`ax_name` and AX
/// properties). Empty values count as absent.
fn attribute_value(raw: &RawNode, name: &str) -> Option<String> {
    let html = raw
        .attr(name)
        .map(collapse_whitespace)
        .filter(|v| !v.is_empty());
    if html.is_some() {
        return html;
    }

    let ax = if name == "ax_name" {
        raw.ax_name().map(collapse_whitespace)
    } else {
        raw.ax_property(name).and_then(ax_value_to_string)
    };
    ax.filter(|v| !v.is_empty())
}

fn ax_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(collapse_whitespace(s)),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn cap_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect::<String>() + "..."
    }
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
