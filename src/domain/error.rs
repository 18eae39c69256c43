//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::node::NodeId;

/// Domain errors represent violations of the tree's structural rules.
/// These are independent of storage and presentation concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("cannot delete root node: {0}")]
    CannotDeleteRoot(NodeId),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("duplicate node id: {0}")]
    DuplicateId(NodeId),

    #[error("node ids exhausted after {0}")]
    IdsExhausted(NodeId),
}
