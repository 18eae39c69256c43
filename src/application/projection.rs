//! Projection of the tree into a nested visual representation.

use termtree::Tree;
use tracing::instrument;

use crate::domain::{self, Node};

pub trait TreeNodeConvert {
    /// Convert into a printable tree; `with_ids` appends each node's id to its label.
    fn to_tree_string(&self, with_ids: bool) -> Tree<String>;
}

impl TreeNodeConvert for Node {
    #[instrument(level = "trace", skip(self))]
    fn to_tree_string(&self, with_ids: bool) -> Tree<String> {
        let leaves: Vec<_> = self
            .children()
            .iter()
            .map(|c| c.to_tree_string(with_ids))
            .collect();

        Tree::new(label(self, with_ids)).with_leaves(leaves)
    }
}

impl TreeNodeConvert for domain::Tree {
    fn to_tree_string(&self, with_ids: bool) -> Tree<String> {
        self.root().to_tree_string(with_ids)
    }
}

fn label(node: &Node, with_ids: bool) -> String {
    if with_ids {
        format!("{} [{}]", node.name(), node.id())
    } else {
        node.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NodeId;

    fn sample() -> Node {
        Node::new(NodeId::new(1), "Root").with_children(vec![
            Node::new(NodeId::new(2), "a").with_children(vec![Node::new(NodeId::new(3), "a1")]),
            Node::new(NodeId::new(4), "b"),
        ])
    }

    #[test]
    fn given_ids_requested_when_rendering_then_labels_carry_ids() {
        let rendered = sample().to_tree_string(true).to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Root [1]");
        assert!(lines[1].ends_with("a [2]"));
        assert!(lines[2].ends_with("a1 [3]"));
        assert!(lines[3].ends_with("b [4]"));
    }

    #[test]
    fn given_plain_render_when_rendering_then_no_ids() {
        let rendered = sample().to_tree_string(false).to_string();
        assert!(!rendered.contains('['));
        assert_eq!(rendered.lines().next(), Some("Root"));
    }
}
