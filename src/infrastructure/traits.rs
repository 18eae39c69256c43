//! I/O boundary traits for testability
//!
//! These traits abstract the collaborators of the tree model (storage medium,
//! view, document exporter), allowing services to be tested with in-memory
//! implementations.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::application::projection::TreeNodeConvert;
use crate::application::services::export::Page;
use crate::domain::Node;

/// Opaque key-value medium holding serialized state.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if the key was never written.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;

    /// Human-readable location of `key`, for status output.
    fn describe(&self, key: &str) -> String {
        format!("slot '{}'", key)
    }
}

/// Visual projection of the tree.
///
/// The model calls `rebuild` after structural changes; there is no
/// incremental diffing.
pub trait TreeView {
    /// Discard the current visual tree and rebuild it from `root`.
    fn rebuild(&mut self, root: &Node);

    /// Show or hide interactive affordances.
    fn set_interactive(&mut self, enabled: bool);

    fn is_interactive(&self) -> bool;

    /// Snapshot of the current visual container.
    fn capture(&self) -> io::Result<String>;
}

/// Writes paginated snapshots to a document file.
pub trait Exporter: Send + Sync {
    fn write_pages(&self, path: &Path, pages: &[Page]) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// File-backed store: one `<key>.json` file per slot inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match std::fs::read_to_string(self.slot_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Atomic overwrite: write a temp file next to the slot, then rename over it.
    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(value.as_bytes())?;
        tmp.as_file().sync_all()?;
        let target = self.slot_path(key);
        tmp.persist(&target).map_err(|e| e.error)?;
        debug!("set: wrote {} bytes to {}", value.len(), target.display());
        Ok(())
    }

    fn describe(&self, key: &str) -> String {
        self.slot_path(key).display().to_string()
    }
}

/// In-process store, used for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "memory store poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Terminal view rendering the tree with box-drawing lines.
///
/// Interactive renders annotate each node with its id (the handle users pass
/// to `add`/`rename`/`remove`) and are echoed to the writer. Non-interactive
/// renders show bare labels and stay offscreen in the container.
pub struct TerminalView {
    out: Box<dyn Write + Send>,
    interactive: bool,
    container: String,
}

impl TerminalView {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out,
            interactive: true,
            container: String::new(),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Last rendered visual tree.
    pub fn container(&self) -> &str {
        &self.container
    }
}

impl std::fmt::Debug for TerminalView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalView")
            .field("interactive", &self.interactive)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

impl TreeView for TerminalView {
    fn rebuild(&mut self, root: &Node) {
        self.container = root.to_tree_string(self.interactive).to_string();
        if self.interactive {
            let written = self
                .out
                .write_all(self.container.as_bytes())
                .and_then(|_| self.out.flush());
            if let Err(e) = written {
                warn!("rebuild: cannot write view: {}", e);
            }
        }
    }

    fn set_interactive(&mut self, enabled: bool) {
        self.interactive = enabled;
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn capture(&self) -> io::Result<String> {
        if self.container.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "nothing rendered to capture",
            ));
        }
        Ok(self.container.clone())
    }
}

/// Page break between pages of a text document (form feed).
pub const PAGE_BREAK: &str = "\x0c";

/// Plain-text exporter: pages separated by form feeds.
#[derive(Debug, Default)]
pub struct PagedTextExporter;

impl Exporter for PagedTextExporter {
    fn write_pages(&self, path: &Path, pages: &[Page]) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let body = pages
            .iter()
            .map(Page::to_string)
            .collect::<Vec<_>>()
            .join(PAGE_BREAK);
        std::fs::write(path, body)
    }
}
