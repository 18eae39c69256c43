//! Application services

pub mod document;
pub mod export;
pub mod persistence;

pub use document::Document;
pub use export::{
    paginate, ExportService, ExportSummary, InteractionGuard, Page, PageLayout,
    DEFAULT_EXPORT_FILE, DEFAULT_PAGE_HEIGHT,
};
pub use persistence::{PersistenceService, DEFAULT_SLOT};
