//! Shared test fixtures and utilities for integration tests.
//!
//! # Test Isolation Strategy
//!
//! Every test builds its own corpus and registry, so scan caches never leak
//! between tests. Two flavours are available:
//! - [`TrackerFixture`]: in-memory corpus behind a [`TrackerState`], with a handle
//!   on the store for mutating documents and counting queries
//! - [`TempWorkspace`]: a temp directory for tests that exercise the file-backed
//!   store, registry manifest and config loading
//!
//! # Available Fixtures
//!
//! - `tracker`: two published documents using `block1`, registry `{block1, block2}`

use module_usage_tracker::{
    Document, DocumentId, DocumentKind, DocumentStatus, MemoryStore, StaticRegistry, TrackerState,
};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// A temporary workspace directory for test isolation.
///
/// Provides basic filesystem operations within a temp directory that is
/// automatically cleaned up when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    /// Creates a new empty temporary workspace.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// Returns the root path of this workspace.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a file with the given content within this workspace.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }

    /// Writes one document as `<dir>/<id>.json`.
    pub fn create_document(&self, dir: &str, document: &Document) {
        let json = serde_json::to_string_pretty(document).expect("Failed to serialize document");
        self.create_file(&format!("{}/{}.json", dir, document.id), &json);
    }

    /// Writes a registry manifest listing `names` with no metadata.
    pub fn create_registry(&self, path: &str, names: &[&str]) {
        let manifest: String = names
            .iter()
            .map(|name| format!("[modules.{}]\n", name))
            .collect();
        self.create_file(path, &manifest);
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// A published page with the given body.
pub fn page(id: u64, content: &str) -> Document {
    Document {
        id: DocumentId::new(id),
        title: format!("Page {}", id),
        kind: DocumentKind::Page,
        status: DocumentStatus::Publish,
        content: content.to_string(),
    }
}

/// A document of arbitrary kind and status.
#[allow(dead_code)]
pub fn document(id: u64, kind: DocumentKind, status: DocumentStatus, content: &str) -> Document {
    Document {
        kind,
        status,
        ..page(id, content)
    }
}

/// An in-memory tracker whose store stays reachable for assertions.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct TrackerFixture {
    pub store: Arc<MemoryStore>,
    pub state: Arc<TrackerState>,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TrackerFixture {
    pub fn new(documents: impl IntoIterator<Item = Document>, modules: &[&str]) -> Self {
        Self::with_state(documents, modules, |state| state)
    }

    /// Build the fixture, letting `configure` adjust the state before it is shared.
    pub fn with_state(
        documents: impl IntoIterator<Item = Document>,
        modules: &[&str],
        configure: impl FnOnce(TrackerState) -> TrackerState,
    ) -> Self {
        let store = Arc::new(MemoryStore::with_documents(documents));
        let registry = Arc::new(StaticRegistry::from_names(modules.iter().copied()));
        let state = configure(TrackerState::new(store.clone(), registry));
        Self {
            store,
            state: Arc::new(state),
        }
    }

    /// The token the tracker currently accepts.
    pub fn token(&self) -> String {
        self.state.access().nonce()
    }
}

/// Documents A (`[block1][block1]`) and B (`[block1]`) with registry `{block1, block2}`.
#[allow(dead_code)]
#[fixture]
pub fn tracker() -> TrackerFixture {
    module_usage_tracker::logging::init();
    TrackerFixture::new(
        [page(1, "[block1][block1]"), page(2, "[block1]")],
        &["block1", "block2"],
    )
}
