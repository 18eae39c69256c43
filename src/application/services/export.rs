//! Export of the rendered tree to a paginated document
//!
//! The view is rendered without interactive affordances, captured, cut into
//! pages and handed to an [`Exporter`]. Affordances are disabled for the whole
//! duration and restored on every exit path.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::Node;
use crate::infrastructure::traits::{Exporter, TreeView};

/// Default file name of an export.
pub const DEFAULT_EXPORT_FILE: &str = "tree-structure.txt";

/// Default number of lines per page.
pub const DEFAULT_PAGE_HEIGHT: usize = 60;

/// Page geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    page_height: usize,
}

impl PageLayout {
    /// Layout with `page_height` lines per page (at least one).
    pub fn new(page_height: usize) -> Self {
        Self {
            page_height: page_height.max(1),
        }
    }

    pub fn page_height(&self) -> usize {
        self.page_height
    }
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_HEIGHT)
    }
}

/// One page of an exported document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    pub lines: Vec<String>,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Cut a captured snapshot into pages.
///
/// The first page always exists; further pages follow while content remains.
/// Content order is preserved across page boundaries.
pub fn paginate(snapshot: &str, layout: PageLayout) -> Vec<Page> {
    let lines: Vec<String> = snapshot.lines().map(str::to_string).collect();
    if lines.is_empty() {
        return vec![Page {
            number: 1,
            lines: Vec::new(),
        }];
    }
    lines
        .chunks(layout.page_height())
        .enumerate()
        .map(|(i, chunk)| Page {
            number: i + 1,
            lines: chunk.to_vec(),
        })
        .collect()
}

/// Disables the view's interactive affordances while alive.
///
/// Dropping the guard restores the previous state, whether the export
/// succeeded or failed.
pub struct InteractionGuard<'a, V: TreeView + ?Sized> {
    view: &'a mut V,
    was_interactive: bool,
}

impl<'a, V: TreeView + ?Sized> InteractionGuard<'a, V> {
    pub fn new(view: &'a mut V) -> Self {
        let was_interactive = view.is_interactive();
        view.set_interactive(false);
        Self {
            view,
            was_interactive,
        }
    }
}

impl<V: TreeView + ?Sized> Deref for InteractionGuard<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        &*self.view
    }
}

impl<V: TreeView + ?Sized> DerefMut for InteractionGuard<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        &mut *self.view
    }
}

impl<V: TreeView + ?Sized> Drop for InteractionGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_interactive(self.was_interactive);
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub pages: usize,
    pub lines: usize,
}

/// Renders, paginates and writes snapshots of the tree.
pub struct ExportService {
    exporter: Arc<dyn Exporter>,
    layout: PageLayout,
}

impl ExportService {
    pub fn new(exporter: Arc<dyn Exporter>, layout: PageLayout) -> Self {
        Self { exporter, layout }
    }

    pub fn layout(&self) -> PageLayout {
        self.layout
    }

    #[instrument(level = "debug", skip(self, view, root))]
    pub fn export<V: TreeView + ?Sized>(
        &self,
        view: &mut V,
        root: &Node,
        path: &Path,
    ) -> ApplicationResult<ExportSummary> {
        let mut guard = InteractionGuard::new(view);
        guard.rebuild(root);
        let snapshot = guard.capture().as_export_failure("capture view")?;

        let pages = paginate(&snapshot, self.layout);
        let lines = pages.iter().map(|p| p.lines.len()).sum();
        self.exporter
            .write_pages(path, &pages)
            .as_export_failure(&format!("write {}", path.display()))?;

        info!("export: {} pages written to {}", pages.len(), path.display());
        Ok(ExportSummary {
            path: path.to_path_buf(),
            pages: pages.len(),
            lines,
        })
    }
}
