//! End-to-end tests: capture in, selector map and text rendering out.

use std::collections::HashSet;

use pagelens_dom::{
    CaptureNode, DomError, DomTree, DomTreeSerializer, SerializedDomState, SerializerConfig,
    EMPTY_DOM_TREE, MAX_CAPTURE_DEPTH,
};

const SHOP_PAGE: &str = include_str!("fixtures/shop_page.json");

fn serialize(capture: CaptureNode) -> SerializedDomState {
    let tree = DomTree::from_capture(&capture).unwrap();
    DomTreeSerializer::default().serialize(tree, None)
}

fn indexed_tags(state: &SerializedDomState) -> Vec<String> {
    state
        .selector_map
        .iter()
        .map(|(_, id)| state.tree()[id].tag_name.clone())
        .collect()
}

#[test]
fn test_button_with_span_label() {
    let state = serialize(
        CaptureNode::element(1, "button")
            .with_child(CaptureNode::element(2, "span").with_child(CaptureNode::text(3, "Buy"))),
    );

    assert_eq!(state.selector_map.len(), 1);
    assert_eq!(state.element(1).map(|n| n.tag_name.as_str()), Some("button"));
    assert_eq!(state.llm_representation(None), "[1]<button>Buy</button>");
}

#[test]
fn test_shop_page_from_json() {
    let tree = DomTree::from_json(SHOP_PAGE).unwrap();
    let state = DomTreeSerializer::default().serialize(tree, None);

    assert_eq!(indexed_tags(&state), vec!["a", "input", "button"]);
    assert_eq!(
        state.llm_representation(None),
        "[1]<a>Home</a>\n\
         |SCROLL|<main /> (1.0↑ 2.0↓ 33.3%)\n\
         \tProducts\n\
         \t[2]<input type=search name=q placeholder=Search products />\n\
         \t[3]<button>Go</button>"
    );
    assert_eq!(state.xpath(3).as_deref(), Some("html/body/main/div/button"));
    assert_eq!(state.element(2).map(|n| n.backend_node_id), Some(1015));
}

#[test]
fn test_shop_page_without_bbox_filter() {
    let config = SerializerConfig {
        enable_bbox_filtering: false,
        ..SerializerConfig::default()
    };
    let tree = DomTree::from_json(SHOP_PAGE).unwrap();
    let state = DomTreeSerializer::new(config).serialize(tree, None);

    // The span has no display attributes, so the line is unchanged
    assert!(state.llm_representation(None).starts_with("[1]<a>Home</a>\n"));
    assert_eq!(state.selector_map.len(), 3);
}

#[test]
fn test_idempotent() {
    let serializer = DomTreeSerializer::default();
    let first = serializer.serialize(DomTree::from_json(SHOP_PAGE).unwrap(), None);
    let second = serializer.serialize(DomTree::from_json(SHOP_PAGE).unwrap(), None);

    assert_eq!(first.selector_map, second.selector_map);
    assert_eq!(first.llm_representation(None), second.llm_representation(None));
}

#[test]
fn test_indices_are_contiguous() {
    let state = serialize(CaptureNode::element(1, "body").with_children(
        (2..12).map(|id| CaptureNode::element(id, "div").with_child(CaptureNode::element(id * 100, "button"))),
    ));
    let expected: Vec<u32> = (1..=10).collect();
    assert_eq!(state.selector_map.indices(), expected);
}

#[test]
fn test_containment_exceptions() {
    let state = serialize(CaptureNode::element(1, "body").with_children([
        CaptureNode::element(2, "button")
            .with_bounds(0.0, 0.0, 300.0, 50.0)
            .with_child(CaptureNode::element(3, "input").with_bounds(10.0, 10.0, 100.0, 30.0)),
        CaptureNode::element(4, "div")
            .with_attr("role", "button")
            .with_bounds(0.0, 100.0, 300.0, 50.0)
            .with_children([
                CaptureNode::element(5, "span")
                    .with_attr("aria-label", "Close")
                    .with_bounds(10.0, 110.0, 20.0, 20.0)
                    .with_child(CaptureNode::text(6, "Dismiss")),
                CaptureNode::element(7, "span")
                    .with_attr("title", "decoration")
                    .with_bounds(40.0, 110.0, 20.0, 20.0)
                    .with_child(CaptureNode::text(8, "Icon")),
            ]),
    ]));

    assert_eq!(indexed_tags(&state), vec!["button", "input", "div"]);

    let root = state.root.as_ref().unwrap();
    let excluded: Vec<i64> = root
        .walk()
        .into_iter()
        .filter(|n| n.excluded_by_parent)
        .map(|n| state.tree()[n.node_id].node_id)
        .collect();
    assert_eq!(excluded, vec![7]);

    assert_eq!(
        state.llm_representation(None),
        "[1]<button />\n\
         \t[2]<input />\n\
         [3]<div role=button />\n\
         \t<span aria-label=Close>Dismiss</span>\n\
         \tIcon"
    );
}

fn buttons_page(backend_ids: &[i64]) -> DomTree {
    let buttons = backend_ids
        .iter()
        .enumerate()
        .map(|(i, &backend_id)| CaptureNode::element(i as i64 + 2, "button").with_backend_id(backend_id));
    DomTree::from_capture(&CaptureNode::element(1, "body").with_children(buttons)).unwrap()
}

fn new_flags(state: &SerializedDomState) -> Vec<bool> {
    state
        .root
        .as_ref()
        .unwrap()
        .walk()
        .into_iter()
        .filter(|n| n.interactive_index.is_some())
        .map(|n| n.is_new)
        .collect()
}

#[test]
fn test_new_element_diffing() {
    let serializer = DomTreeSerializer::default();
    let previous = serializer.serialize(buttons_page(&[10, 11]), None);

    let same = serializer.serialize(buttons_page(&[10, 11]), Some(&previous));
    assert_eq!(new_flags(&same), vec![false, false]);

    let disjoint = serializer.serialize(buttons_page(&[20, 21]), Some(&previous));
    assert_eq!(new_flags(&disjoint), vec![true, true]);
    assert_eq!(disjoint.llm_representation(None), "*[1]<button />\n*[2]<button />");

    assert_eq!(
        previous.backend_node_ids(),
        [10, 11].into_iter().collect::<HashSet<i64>>()
    );
}

#[test]
fn test_blank_page_renders_sentinel() {
    let state = serialize(CaptureNode::document(1).with_child(
        CaptureNode::element(2, "html").with_child(CaptureNode::element(3, "body").with_child(CaptureNode::text(4, " "))),
    ));
    assert!(state.root.is_none());
    assert_eq!(state.llm_representation(None), EMPTY_DOM_TREE);
}

#[test]
fn test_deep_capture_within_limit() {
    let depth = MAX_CAPTURE_DEPTH;
    let mut json = String::new();
    for id in 1..=depth {
        json.push_str(&format!(
            r#"{{"nodeId":{},"nodeType":1,"nodeName":"DIV","isVisible":true,"children":["#,
            id
        ));
    }
    json.push_str(r#"{"nodeId":0,"nodeType":1,"nodeName":"BUTTON","isVisible":true}"#);
    for _ in 0..depth {
        json.push_str("]}");
    }

    let tree = DomTree::from_json(&json).unwrap();
    assert_eq!(tree.len(), depth + 1);

    let state = DomTreeSerializer::default().serialize(tree, None);
    assert_eq!(indexed_tags(&state), vec!["button"]);
}

#[test]
fn test_malformed_capture_rejected() {
    let json = r#"{"nodeId":1,"nodeType":1,"nodeName":"DIV","attributes":["id"]}"#;
    assert!(matches!(DomTree::from_json(json), Err(DomError::MalformedAttributes(1))));
}
