//! Tests for ExportService: paginated document output and view state restore

use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use arbor::application::services::{
    Document, ExportService, InteractionGuard, Page, PageLayout, PersistenceService, DEFAULT_SLOT,
};
use arbor::application::ApplicationError;
use arbor::domain::{Node, NodeId};
use arbor::infrastructure::traits::{
    Exporter, MemoryStore, PagedTextExporter, TerminalView, TreeView, PAGE_BREAK,
};
use arbor::util::testing;

/// Writer sharing its buffer with the test.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct FailingExporter;

impl Exporter for FailingExporter {
    fn write_pages(&self, _path: &Path, _pages: &[Page]) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }
}

/// View that renders fine but cannot be captured.
struct BlindView {
    interactive: bool,
}

impl TreeView for BlindView {
    fn rebuild(&mut self, _root: &Node) {}

    fn set_interactive(&mut self, enabled: bool) {
        self.interactive = enabled;
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn capture(&self) -> io::Result<String> {
        Err(io::Error::new(io::ErrorKind::Other, "no surface"))
    }
}

fn id(raw: u64) -> NodeId {
    NodeId::new(raw)
}

/// Root with `n` children named c0..c(n-1); renders to n + 1 lines.
fn wide_root(n: u64) -> Node {
    Node::new(id(1), "Root").with_children(
        (0..n)
            .map(|i| Node::new(id(i + 2), format!("c{}", i)))
            .collect(),
    )
}

fn service(exporter: Arc<dyn Exporter>, page_height: usize) -> ExportService {
    ExportService::new(exporter, PageLayout::new(page_height))
}

// ============================================================
// Document output
// ============================================================

#[test]
fn given_small_tree_when_exporting_then_single_page_without_ids() {
    testing::init_test_setup();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("tree-structure.txt");
    let mut view = TerminalView::new(Box::new(io::sink()));

    let summary = service(Arc::new(PagedTextExporter), 60)
        .export(&mut view, &wide_root(2), &path)
        .unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.lines, 3);
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(!text.contains(PAGE_BREAK));
    assert!(text.contains("Root"));
    assert!(text.contains("c1"));
    assert!(!text.contains('['), "ids leaked into export: {}", text);
}

#[test]
fn given_tall_tree_when_exporting_then_pages_split_in_order() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("out").join("tree.txt");
    let mut view = TerminalView::new(Box::new(io::sink()));

    let summary = service(Arc::new(PagedTextExporter), 4)
        .export(&mut view, &wide_root(9), &path)
        .unwrap();

    assert_eq!(summary.lines, 10);
    assert_eq!(summary.pages, 3);
    let text = std::fs::read_to_string(&path).unwrap();
    let pages: Vec<&str> = text.split(PAGE_BREAK).collect();
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0].lines().count(), 4);
    assert_eq!(pages[2].lines().count(), 2);
    assert!(pages[0].starts_with("Root"));
    assert!(pages[2].contains("c8"));
}

#[test]
fn given_interactive_view_when_exporting_then_nothing_echoed_and_state_restored() {
    let tmp = TempDir::new().unwrap();
    let buf = SharedBuf::default();
    let mut view = TerminalView::new(Box::new(buf.clone()));

    service(Arc::new(PagedTextExporter), 60)
        .export(&mut view, &wide_root(1), &tmp.path().join("t.txt"))
        .unwrap();

    assert!(view.is_interactive());
    assert_eq!(buf.contents(), "");
}

// ============================================================
// Failure paths restore interactivity
// ============================================================

#[test]
fn given_failing_exporter_when_exporting_then_export_error_and_state_restored() {
    let tmp = TempDir::new().unwrap();
    let mut view = TerminalView::new(Box::new(io::sink()));

    let result = service(Arc::new(FailingExporter), 60).export(
        &mut view,
        &wide_root(1),
        &tmp.path().join("t.txt"),
    );

    assert!(matches!(result, Err(ApplicationError::Export { .. })));
    assert!(view.is_interactive());
}

#[test]
fn given_uncapturable_view_when_exporting_then_export_error_and_state_restored() {
    let tmp = TempDir::new().unwrap();
    let mut view = BlindView { interactive: true };

    let result = service(Arc::new(PagedTextExporter), 60).export(
        &mut view,
        &wide_root(1),
        &tmp.path().join("t.txt"),
    );

    assert!(matches!(result, Err(ApplicationError::Export { .. })));
    assert!(view.is_interactive());
    assert!(!tmp.path().join("t.txt").exists());
}

#[test]
fn given_non_interactive_view_when_guard_dropped_then_stays_non_interactive() {
    let mut view = BlindView { interactive: false };

    {
        let guard = InteractionGuard::new(&mut view);
        assert!(!guard.is_interactive());
    }

    assert!(!view.is_interactive());
}

#[test]
fn given_interactive_view_when_guard_alive_then_disabled_until_drop() {
    let mut view = BlindView { interactive: true };

    {
        let mut guard = InteractionGuard::new(&mut view);
        assert!(!guard.is_interactive());
        guard.rebuild(&wide_root(0));
    }

    assert!(view.is_interactive());
}

// ============================================================
// Through the document
// ============================================================

#[test]
fn given_document_when_exporting_then_tree_unchanged_and_view_interactive() {
    let tmp = TempDir::new().unwrap();
    let store = Arc::new(MemoryStore::new());
    let mut doc = Document::load_or_init(
        PersistenceService::new(store, DEFAULT_SLOT),
        TerminalView::new(Box::new(io::sink())),
    );
    let child = doc.add_child(doc.tree().root_id()).unwrap();
    doc.rename_node(child, "exported").unwrap();
    let before = doc.root().clone();

    let summary = doc
        .export(
            &service(Arc::new(PagedTextExporter), 60),
            &tmp.path().join("doc.txt"),
        )
        .unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(doc.root(), &before);
    assert!(doc.view().is_interactive());
    let text = std::fs::read_to_string(tmp.path().join("doc.txt")).unwrap();
    assert!(text.contains("exported"));
}
