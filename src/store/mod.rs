//! Read-only access to the document corpus.
//!
//! The tracker never writes documents. Every query reads the corpus as it is at
//! that moment; a scan is a sequence of such queries and sees read-committed state.

pub mod directory;
pub mod memory;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::fingerprint::Fingerprint;
use crate::types::{Document, DocumentId, DocumentRecord};
use memchr::memmem;

/// Query interface over the document corpus.
pub trait DocumentStore: Send + Sync {
    /// Published pages and posts whose content contains `needle` (case-sensitive,
    /// literal; `needle` is never interpreted as a pattern).
    fn find_containing(&self, needle: &str) -> Result<Vec<DocumentRecord>, StoreError>;

    /// Look up a single document by id, regardless of type or status.
    fn document(&self, id: DocumentId) -> Result<Option<Document>, StoreError>;

    /// Digest of the current corpus state. Any document write changes it.
    fn fingerprint(&self) -> Result<Fingerprint, StoreError>;
}

/// Literal containment check shared by store implementations.
pub(crate) fn contains_literal(haystack: &str, needle: &str) -> bool {
    memmem::find(haystack.as_bytes(), needle.as_bytes()).is_some()
}
