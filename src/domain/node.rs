//! Tree nodes and their identifiers

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Name given to the root of a fresh tree.
pub const ROOT_NAME: &str = "Root";

/// Name given to every newly added child.
pub const NODE_NAME: &str = "Node";

/// Addressing key of a node.
///
/// Serialized as a bare JSON number so persisted trees keep the
/// `{id, name, children}` layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A labeled tree element owning its ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Immutable identifier, unique within a tree
    id: NodeId,
    /// Display label, may be empty
    name: String,
    /// Children in insertion order
    children: Vec<Node>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Builder-style constructor for restoring or composing subtrees.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_size).sum::<usize>()
    }

    /// Pre-order search: the node itself, then each child in stored order.
    /// First match wins.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub(crate) fn find_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn push_child(&mut self, child: Node) -> &Node {
        let idx = self.children.len();
        self.children.push(child);
        &self.children[idx]
    }

    /// Detach the first node with `id` found below this one, together with its subtree.
    ///
    /// Each level is filtered before descending, so a direct child is preferred
    /// over a deeper match.
    pub(crate) fn detach(&mut self, id: NodeId) -> Option<Node> {
        if let Some(pos) = self.children.iter().position(|c| c.id == id) {
            return Some(self.children.remove(pos));
        }
        self.children
            .iter_mut()
            .find_map(|child| child.detach(id))
    }
}

/// Issues node ids.
///
/// Ids are derived from the millisecond clock but never repeat: every id is
/// strictly greater than the last one issued or observed, so two nodes created
/// within the same tick still get distinct ids. Once `u64::MAX` has been
/// issued the generator is exhausted.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh generator together with its first id.
    pub fn start() -> (Self, NodeId) {
        Self::start_at(now_millis())
    }

    fn start_at(now: u64) -> (Self, NodeId) {
        let first = now.max(1);
        (Self { last: first }, NodeId(first))
    }

    /// Generator whose next id is guaranteed to exceed `floor`.
    pub fn seeded(floor: NodeId) -> Self {
        Self { last: floor.get() }
    }

    pub fn last_issued(&self) -> Option<NodeId> {
        (self.last > 0).then_some(NodeId(self.last))
    }

    pub fn next_id(&mut self) -> Result<NodeId, DomainError> {
        self.next_at(now_millis())
    }

    /// Next id given the current clock reading `now` (milliseconds).
    pub fn next_at(&mut self, now: u64) -> Result<NodeId, DomainError> {
        let floor = self
            .last
            .checked_add(1)
            .ok_or(DomainError::IdsExhausted(NodeId(self.last)))?;
        let id = now.max(floor);
        self.last = id;
        Ok(NodeId(id))
    }
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
