//! Document session: the tree model bound to its slot and its view
//!
//! Every mutation runs to completion, persists the whole tree, and (for
//! structural changes) asks the view to rebuild from the root.

use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::application::services::export::{ExportService, ExportSummary};
use crate::application::services::persistence::PersistenceService;
use crate::application::ApplicationResult;
use crate::domain::{IdGenerator, Node, NodeId, Tree};
use crate::infrastructure::traits::TreeView;

/// The single editable tree of a session.
pub struct Document<V: TreeView> {
    tree: Tree,
    ids: IdGenerator,
    persistence: PersistenceService,
    view: V,
}

impl<V: TreeView> Document<V> {
    /// Restore the tree saved in the slot, or start a fresh root-only tree.
    ///
    /// Malformed saved state, including duplicate ids, is discarded.
    #[instrument(level = "debug", skip_all)]
    pub fn load_or_init(persistence: PersistenceService, view: V) -> Self {
        let restored = persistence
            .load()
            .and_then(|root| match Tree::from_root(root) {
                Ok(tree) => Some(tree),
                Err(e) => {
                    warn!("load_or_init: discarding saved tree: {}", e);
                    None
                }
            });

        let (tree, ids) = match restored {
            Some(tree) => {
                debug!("load_or_init: restored {} nodes", tree.node_count());
                let ids = IdGenerator::seeded(tree.max_id());
                (tree, ids)
            }
            None => {
                let (ids, root) = IdGenerator::start();
                debug!("load_or_init: fresh tree, root {}", root);
                (Tree::new(root), ids)
            }
        };

        Self {
            tree,
            ids,
            persistence,
            view,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn root(&self) -> &Node {
        self.tree.root()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn persistence(&self) -> &PersistenceService {
        &self.persistence
    }

    /// Rebuild the view from the current root.
    pub fn render(&mut self) {
        self.view.rebuild(self.tree.root());
    }

    /// Append a new child named "Node" to `parent` and return its id.
    ///
    /// An unknown parent or an exhausted id space is an error; the tree is
    /// left untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, parent: NodeId) -> ApplicationResult<NodeId> {
        let id = self.ids.next_id()?;
        let child = self.tree.add_child(parent, id)?.id();
        info!("add_child: {} under {}", child, parent);
        self.commit(true)?;
        Ok(child)
    }

    /// Overwrite a node's label. A missing id is a silent no-op.
    ///
    /// Persists in either case but does not rebuild the view.
    #[instrument(level = "debug", skip(self, name))]
    pub fn rename_node(&mut self, id: NodeId, name: impl Into<String>) -> ApplicationResult<bool> {
        let renamed = self.tree.rename(id, name);
        if !renamed {
            debug!("rename_node: no node {}", id);
        }
        self.commit(false)?;
        Ok(renamed)
    }

    /// Remove a node and its subtree. The root cannot be removed.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, id: NodeId) -> ApplicationResult<()> {
        match self.tree.remove(id)? {
            Some(removed) => info!(
                "remove_node: {} ({} nodes)",
                id,
                removed.subtree_size()
            ),
            None => debug!("remove_node: no node {}", id),
        }
        self.commit(true)
    }

    /// Replace the whole tree with a fresh root-only tree.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(&mut self) -> ApplicationResult<()> {
        self.tree = Tree::new(self.ids.next_id()?);
        info!("reset: new root {}", self.tree.root_id());
        self.commit(true)
    }

    /// Export a paginated snapshot of the view.
    pub fn export(&mut self, service: &ExportService, path: &Path) -> ApplicationResult<ExportSummary> {
        service.export(&mut self.view, self.tree.root(), path)
    }

    fn commit(&mut self, rebuild: bool) -> ApplicationResult<()> {
        self.persistence.save(self.tree.root())?;
        if rebuild {
            self.view.rebuild(self.tree.root());
        }
        Ok(())
    }
}
