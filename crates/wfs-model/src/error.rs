//! Error types for the model tree.

use wfs_content::ContentError;
use wfs_schema::SchemaError;
use wfs_types::{NodeId, TypeError};

/// Errors that can occur during tree operations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// A referenced node does not exist in the tree.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The child already has an owner; move it with `reparent`.
    #[error("node {child} is already owned by {owner}")]
    OwnershipViolation { child: NodeId, owner: NodeId },

    /// Attaching the child would make it its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    CycleDetected { child: NodeId, parent: NodeId },

    /// A typed accessor was used on a node of another container type.
    #[error("node {node} is a {found}, not a {expected}")]
    WrongContainer {
        node: NodeId,
        expected: String,
        found: String,
    },

    /// A content list rejected the operation.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// The schema descriptor rejected a lookup.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A schema default could not be converted to the attribute's type.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Snapshot encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;
