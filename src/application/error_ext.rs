//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with slot context.

use std::io;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add slot context to an I/O error from a key-value store.
    fn with_slot_context(self, action: &str, slot: &str) -> ApplicationResult<T>;

    /// Wrap an I/O error as an export failure.
    ///
    /// # Example
    /// ```ignore
    /// exporter.write_pages(&path, &pages)
    ///     .as_export_failure("write export")?;
    /// ```
    fn as_export_failure(self, action: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_slot_context(self, action: &str, slot: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{} slot '{}'", action, slot),
            source: Box::new(e),
        })
    }

    fn as_export_failure(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::Export {
            context: action.to_string(),
            source: Box::new(e),
        })
    }
}
