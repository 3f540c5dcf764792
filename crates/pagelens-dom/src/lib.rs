//! DOM simplification and serialization for LLM browser agents.
//!
//! Turns one merged DOM/accessibility/layout capture into:
//! - a pruned tree holding only what matters for automation,
//! - a selector map from integer index to element, and
//! - an indented text rendering for the model prompt.
//!
//! ## Pipeline
//!
//! ```text
//! CaptureNode ──► DomTree ──► simplify ──► optimize ──► bbox filter ──► index ──► text
//! ```
//!
//! Every call is synchronous and self-contained. The only cross-call input is
//! the previous [`SerializedDomState`], used to flag newly appeared elements.
//!
//! ## Example
//!
//! ```
//! use pagelens_dom::{CaptureNode, DomTree, DomTreeSerializer};
//!
//! let capture = CaptureNode::element(1, "button")
//!     .with_bounds(0.0, 0.0, 80.0, 30.0)
//!     .with_child(CaptureNode::text(2, "Buy"));
//! let tree = DomTree::from_capture(&capture).unwrap();
//!
//! let state = DomTreeSerializer::default().serialize(tree, None);
//! assert_eq!(state.llm_representation(None), "[1]<button>Buy</button>");
//! ```

mod bbox;
mod capture;
mod detector;
mod error;
pub mod geometry;
mod indexer;
mod optimizer;
mod serializer;
mod simplifier;
mod state;
mod text;
mod tree;

pub use capture::{CaptureNode, MAX_CAPTURE_DEPTH};
pub use detector::{DefaultInteractivityDetector, InteractivityDetector};
pub use error::DomError;
pub use geometry::{generate_xpath, is_actually_scrollable, scroll_info, ScrollInfo};
pub use pagelens_config::SerializerConfig;
pub use serializer::DomTreeSerializer;
pub use state::{SelectorMap, SerializedDomState, SimplifiedNode};
pub use text::{TextSerializer, EMPTY_DOM_TREE};
pub use tree::{AxNode, AxProperty, DomTree, NodeId, NodeType, RawNode, Rect, SnapshotNode};
