//! Persistence adapter
//!
//! Stores the whole tree as JSON in a single named slot of a key-value store.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::Node;
use crate::infrastructure::traits::KeyValueStore;

/// Slot name used when none is configured.
pub const DEFAULT_SLOT: &str = "savedTree";

/// Loads and saves the serialized tree.
pub struct PersistenceService {
    store: Arc<dyn KeyValueStore>,
    slot: String,
}

impl PersistenceService {
    pub fn new(store: Arc<dyn KeyValueStore>, slot: impl Into<String>) -> Self {
        Self {
            store,
            slot: slot.into(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Where the slot lives, for status output.
    pub fn location(&self) -> String {
        self.store.describe(&self.slot)
    }

    /// Previously saved tree, or `None` when there is no usable prior state.
    ///
    /// Read and parse failures degrade to `None`; they are logged, never returned.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self) -> Option<Node> {
        match self.read() {
            Ok(root) => root,
            Err(e) => {
                warn!("load: ignoring saved state: {}", e);
                None
            }
        }
    }

    /// Strict variant of [`load`](Self::load): distinguishes "absent" from "unreadable".
    pub fn read(&self) -> ApplicationResult<Option<Node>> {
        let content = self
            .store
            .get(&self.slot)
            .with_slot_context("read", &self.slot)?;

        let Some(content) = content.filter(|c| !c.trim().is_empty()) else {
            debug!("read: slot '{}' is empty", self.slot);
            return Ok(None);
        };

        parse_tree(&content)
            .map(Some)
            .map_err(|e| ApplicationError::MalformedState {
                slot: self.slot.clone(),
                source: Box::new(e),
            })
    }

    /// Serialize the whole tree and overwrite the slot.
    #[instrument(level = "debug", skip(self, root))]
    pub fn save(&self, root: &Node) -> ApplicationResult<()> {
        let json = serde_json::to_string(root).map_err(|e| ApplicationError::OperationFailed {
            context: format!("serialize tree for slot '{}'", self.slot),
            source: Box::new(e),
        })?;
        self.store
            .set(&self.slot, &json)
            .with_slot_context("write", &self.slot)?;
        debug!("save: slot '{}' updated ({} bytes)", self.slot, json.len());
        Ok(())
    }
}

/// Parse a serialized tree of any depth.
///
/// Every tree level nests two JSON levels, so serde_json's default recursion
/// limit is lifted and the stack grows on demand instead.
fn parse_tree(content: &str) -> serde_json::Result<Node> {
    let mut de = serde_json::Deserializer::from_str(content);
    de.disable_recursion_limit();
    let root = Node::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(root)
}
