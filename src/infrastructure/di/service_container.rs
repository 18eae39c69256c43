//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{Document, ExportService, PageLayout, PersistenceService};
use crate::config::Settings;
use crate::infrastructure::traits::{
    Exporter, FileStore, KeyValueStore, PagedTextExporter, TreeView,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Key-value medium holding the tree slot
    pub store: Arc<dyn KeyValueStore>,

    /// Document writer used by exports
    pub exporter: Arc<dyn Exporter>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let store = Arc::new(FileStore::new(settings.store_dir.clone()));
        Self::with_deps(settings, store, Arc::new(PagedTextExporter))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        store: Arc<dyn KeyValueStore>,
        exporter: Arc<dyn Exporter>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            store,
            exporter,
        }
    }

    pub fn persistence(&self) -> PersistenceService {
        PersistenceService::new(self.store.clone(), self.settings.slot.clone())
    }

    pub fn export_service(&self) -> ExportService {
        ExportService::new(
            self.exporter.clone(),
            PageLayout::new(self.settings.export.page_height),
        )
    }

    /// Open the session document, restoring saved state if any.
    pub fn document<V: TreeView>(&self, view: V) -> Document<V> {
        Document::load_or_init(self.persistence(), view)
    }
}
