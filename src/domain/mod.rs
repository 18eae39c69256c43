//! Domain layer: the tree and its structural rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod node;
pub mod tree;

pub use error::DomainError;
pub use node::{IdGenerator, Node, NodeId, NODE_NAME, ROOT_NAME};
pub use tree::{Tree, TreeIterator, TreeResult};
