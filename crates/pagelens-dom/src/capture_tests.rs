use super::*;

#[test]
fn test_from_json_cdp_shape() {
    let json = r##"{
        "nodeId": 1,
        "backendNodeId": 101,
        "nodeType": 9,
        "nodeName": "#document",
        "children": [{
            "nodeId": 2,
            "backendNodeId": 102,
            "nodeType": 1,
            "nodeName": "HTML",
            "attributes": ["lang", "en"],
            "isVisible": true,
            "snapshot": {
                "bounds": {"x": 0, "y": 0, "width": 1280, "height": 720},
                "clientRects": {"x": 0, "y": 0, "width": 1280, "height": 720},
                "scrollRects": {"x": 0, "y": 0, "width": 1280, "height": 3000},
                "computedStyles": {"overflow": "auto"}
            },
            "ax": {"role": "RootWebArea", "name": "Example", "properties": [
                {"name": "focusable", "value": true}
            ]},
            "children": [{
                "nodeId": 3,
                "backendNodeId": 103,
                "nodeType": 3,
                "nodeName": "#text",
                "nodeValue": "Hello"
            }]
        }]
    }"##;

    let tree = DomTree::from_json(json).unwrap();
    assert_eq!(tree.len(), 3);

    let document = &tree[tree.root()];
    assert_eq!(document.node_type, NodeType::Document);
    assert_eq!(document.backend_node_id, 101);

    let html = document.children[0];
    assert_eq!(tree[html].tag_name, "html");
    assert_eq!(tree[html].attr("lang"), Some("en"));
    assert_eq!(tree[html].parent, Some(tree.root()));
    assert_eq!(
        tree[html].snapshot.as_ref().unwrap().scroll_rects.unwrap().height,
        3000.0
    );
    assert_eq!(tree[html].ax_name(), Some("Example"));

    let text = tree[html].children[0];
    assert_eq!(tree[text].node_value, "Hello");
    assert_eq!(tree[text].is_visible, None);
}

#[test]
fn test_arena_is_preorder() {
    let capture = CaptureNode::document(1).with_child(
        CaptureNode::element(2, "html").with_children([
            CaptureNode::element(3, "head"),
            CaptureNode::element(4, "body").with_child(CaptureNode::text(5, "Hi")),
        ]),
    );
    let tree = DomTree::from_capture(&capture).unwrap();
    let ids: Vec<i64> = tree.iter().map(|(_, n)| n.node_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_content_document_parent_is_iframe() {
    let capture = CaptureNode::element(1, "iframe").with_content_document(
        CaptureNode::document(2).with_child(CaptureNode::element(3, "html")),
    );
    let tree = DomTree::from_capture(&capture).unwrap();
    let iframe = tree.root();
    let document = tree[iframe].content_document.unwrap();
    assert_eq!(tree[document].parent, Some(iframe));
    assert!(tree[iframe].children.is_empty());
}

#[test]
fn test_attribute_names_lowercased() {
    let capture = CaptureNode::element(1, "div").with_attr("Aria-Label", "Menu");
    let tree = DomTree::from_capture(&capture).unwrap();
    assert_eq!(tree[tree.root()].attr("aria-label"), Some("Menu"));
}

#[test]
fn test_rejects_duplicate_node_id() {
    let capture = CaptureNode::element(1, "div").with_child(CaptureNode::element(1, "span"));
    let err = DomTree::from_capture(&capture).unwrap_err();
    assert!(matches!(err, DomError::DuplicateNodeId(1)));
}

#[test]
fn test_rejects_unknown_node_type() {
    let mut capture = CaptureNode::element(1, "div");
    capture.node_type = 42;
    let err = DomTree::from_capture(&capture).unwrap_err();
    assert!(matches!(err, DomError::UnknownNodeType { node_id: 1, code: 42 }));
}

#[test]
fn test_rejects_odd_attribute_list() {
    let mut capture = CaptureNode::element(1, "div");
    capture.attributes = vec!["class".to_string()];
    let err = DomTree::from_capture(&capture).unwrap_err();
    assert!(matches!(err, DomError::MalformedAttributes(1)));
}

#[test]
fn test_rejects_excessive_depth() {
    let mut capture = CaptureNode::element(0, "div");
    for id in 1..=(MAX_CAPTURE_DEPTH as i64 + 1) {
        capture = CaptureNode::element(id, "div").with_child(capture);
    }
    let err = DomTree::from_capture(&capture).unwrap_err();
    assert!(matches!(err, DomError::TooDeep(_)));
}

fn nested_json(levels: usize) -> String {
    let mut json = String::new();
    for id in 1..=levels {
        json.push_str(&format!(
            r#"{{"nodeId":{},"nodeType":1,"nodeName":"DIV","isVisible":true,"children":["#,
            id
        ));
    }
    json.push_str(r#"{"nodeId":0,"nodeType":1,"nodeName":"BUTTON","isVisible":true}"#);
    json.push_str(&"]}".repeat(levels));
    json
}

#[test]
fn test_from_json_accepts_max_depth() {
    let tree = DomTree::from_json(&nested_json(MAX_CAPTURE_DEPTH)).unwrap();
    assert_eq!(tree.len(), MAX_CAPTURE_DEPTH + 1);
}

#[test]
fn test_from_json_rejects_excessive_depth() {
    let err = DomTree::from_json(&nested_json(MAX_CAPTURE_DEPTH + 1)).unwrap_err();
    assert!(matches!(err, DomError::TooDeep(MAX_CAPTURE_DEPTH)));
}

#[test]
fn test_from_json_rejects_runaway_nesting() {
    let err = DomTree::from_json(&nested_json(10_000)).unwrap_err();
    assert!(matches!(err, DomError::Json(_)));

    let err = DomTree::from_reader(nested_json(10_000).as_bytes()).unwrap_err();
    assert!(matches!(err, DomError::Json(_)));
}

#[test]
fn test_rejects_invalid_json() {
    let err = DomTree::from_json("{\"nodeId\": 1").unwrap_err();
    assert!(matches!(err, DomError::Json(_)));
}

#[test]
fn test_from_reader() {
    let json = r#"{"nodeId": 1, "nodeType": 1, "nodeName": "BUTTON", "isVisible": true}"#;
    let tree = DomTree::from_reader(json.as_bytes()).unwrap();
    assert_eq!(tree[tree.root()].tag_name, "button");
    assert_eq!(tree[tree.root()].backend_node_id, 0);
}

#[test]
fn test_builder_defaults_backend_id_to_node_id() {
    let capture = CaptureNode::element(7, "a");
    assert_eq!(capture.backend_node_id, 7);
    assert_eq!(capture.node_name, "A");
    assert_eq!(capture.is_visible, Some(true));
    assert_eq!(capture.hidden().is_visible, Some(false));
}
