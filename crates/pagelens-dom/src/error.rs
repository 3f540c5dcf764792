//! Capture ingestion errors.

use thiserror::Error;

/// Errors raised while ingesting a capture into a [`DomTree`](crate::DomTree).
///
/// The serialization pipeline itself never fails; a capture that cannot be
/// ingested should be retried by the caller.
#[derive(Debug, Error)]
pub enum DomError {
    /// Two nodes in one capture share a `nodeId`.
    #[error("Duplicate node id {0} in capture")]
    DuplicateNodeId(i64),

    /// A `nodeType` outside the DOM specification.
    #[error("Unknown node type {code} on node {node_id}")]
    UnknownNodeType { node_id: i64, code: i64 },

    /// The flat attribute list did not contain name/value pairs.
    #[error("Malformed attribute list on node {0}: expected name/value pairs")]
    MalformedAttributes(i64),

    /// The capture nests deeper than the ingest limit.
    #[error("Capture nesting exceeds {0} levels")]
    TooDeep(usize),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
