//! The rooted tree and its structural rules

use std::collections::HashSet;

use tracing::instrument;

use crate::domain::error::DomainError;
use crate::domain::node::{Node, NodeId, NODE_NAME, ROOT_NAME};

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// A single rooted tree.
///
/// Nodes are owned through their parent's child list and addressed by id via
/// traversal; there is no side index. The root id is fixed for the lifetime of
/// the value and all ids are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    root: Node,
}

impl Tree {
    /// Fresh root-only tree.
    pub fn new(root_id: NodeId) -> Self {
        Self {
            root: Node::new(root_id, ROOT_NAME),
        }
    }

    /// Adopt an existing node hierarchy, rejecting duplicate ids.
    #[instrument(level = "debug", skip(root))]
    pub fn from_root(root: Node) -> TreeResult<Self> {
        let tree = Self { root };
        let mut seen = HashSet::new();
        for node in tree.iter() {
            if !seen.insert(node.id()) {
                return Err(DomainError::DuplicateId(node.id()));
            }
        }
        Ok(tree)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_id(&self) -> NodeId {
        self.root.id()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Total number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.root.subtree_size()
    }

    /// Largest id present in the tree.
    pub fn max_id(&self) -> NodeId {
        self.iter()
            .map(Node::id)
            .max()
            .unwrap_or_else(|| self.root_id())
    }

    /// Number of levels; a root-only tree has depth 1.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        Self::calculate_depth(&self.root)
    }

    fn calculate_depth(node: &Node) -> usize {
        1 + node
            .children()
            .iter()
            .map(Self::calculate_depth)
            .max()
            .unwrap_or(0)
    }

    /// Nodes without children, left to right.
    pub fn leaves(&self) -> Vec<&Node> {
        self.iter().filter(|n| n.is_leaf()).collect()
    }

    /// Pre-order traversal, children in stored order.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(&self.root)
    }

    /// Append a new child named "Node" with the given id as the last child of `parent`.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, parent: NodeId, id: NodeId) -> TreeResult<&Node> {
        if self.contains(id) {
            return Err(DomainError::DuplicateId(id));
        }
        let parent_node = self
            .root
            .find_mut(parent)
            .ok_or(DomainError::NodeNotFound(parent))?;
        Ok(parent_node.push_child(Node::new(id, NODE_NAME)))
    }

    /// Overwrite the label of the node with `id`. Returns false when no such node exists.
    #[instrument(level = "debug", skip(self, name))]
    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> bool {
        match self.root.find_mut(id) {
            Some(node) => {
                node.set_name(name.into());
                true
            }
            None => false,
        }
    }

    /// Remove the node with `id` and its whole subtree.
    ///
    /// The root cannot be removed. An unknown id removes nothing and yields `Ok(None)`.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, id: NodeId) -> TreeResult<Option<Node>> {
        if id == self.root_id() {
            return Err(DomainError::CannotDeleteRoot(id));
        }
        Ok(self.root.detach(id))
    }
}

pub struct TreeIterator<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> TreeIterator<'a> {
    fn new(root: &'a Node) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(current.children().iter().rev());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> NodeId {
        NodeId::new(raw)
    }

    #[test]
    fn given_nested_tree_when_iterating_then_yields_preorder() {
        let root = Node::new(id(1), "r").with_children(vec![
            Node::new(id(2), "a").with_children(vec![Node::new(id(3), "a1")]),
            Node::new(id(4), "b"),
        ]);
        let tree = Tree::from_root(root).unwrap();

        let order: Vec<u64> = tree.iter().map(|n| n.id().get()).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.max_id(), id(4));
        let leaves: Vec<&str> = tree.leaves().iter().map(|n| n.name()).collect();
        assert_eq!(leaves, vec!["a1", "b"]);
    }

    #[test]
    fn given_duplicate_ids_when_adopting_root_then_rejected() {
        let root = Node::new(id(1), "r").with_children(vec![
            Node::new(id(2), "a").with_children(vec![Node::new(id(2), "again")]),
        ]);
        assert!(matches!(
            Tree::from_root(root),
            Err(DomainError::DuplicateId(dup)) if dup == id(2)
        ));
    }

    #[test]
    fn given_existing_id_when_adding_then_duplicate_rejected() {
        let mut tree = Tree::new(id(1));
        tree.add_child(id(1), id(2)).unwrap();
        let before = tree.clone();

        let result = tree.add_child(id(1), id(2));

        assert!(matches!(result, Err(DomainError::DuplicateId(_))));
        assert_eq!(tree, before);
    }

    #[test]
    fn given_unknown_parent_when_adding_then_not_found() {
        let mut tree = Tree::new(id(1));
        let result = tree.add_child(id(9), id(2));
        assert!(matches!(result, Err(DomainError::NodeNotFound(p)) if p == id(9)));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn given_unknown_id_when_removing_then_nothing_removed() {
        let mut tree = Tree::new(id(1));
        tree.add_child(id(1), id(2)).unwrap();
        assert_eq!(tree.remove(id(99)).unwrap(), None);
        assert_eq!(tree.node_count(), 2);
    }
}
