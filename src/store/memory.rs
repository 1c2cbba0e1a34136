//! In-memory document store.

use super::{DocumentStore, contains_literal};
use crate::error::StoreError;
use crate::fingerprint::{Fingerprint, FingerprintBuilder};
use crate::types::{Document, DocumentId, DocumentRecord};
use std::collections::BTreeMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A corpus held in memory, keyed and iterated by document id.
///
/// Writes go through `&self` so a store shared behind an `Arc` can be mutated
/// between scans.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<BTreeMap<DocumentId, Document>>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let store = Self::new();
        for document in documents {
            store.insert(document);
        }
        store
    }

    /// Insert or replace a document.
    pub fn insert(&self, document: Document) {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        documents.insert(document.id, document);
    }

    pub fn remove(&self, id: DocumentId) -> Option<Document> {
        let mut documents = self
            .documents
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        documents.remove(&id)
    }

    /// Number of `find_containing` queries served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<DocumentId, Document>>, StoreError> {
        self.documents.read().map_err(|_| StoreError::Unreachable {
            reason: "in-memory corpus lock poisoned".to_string(),
        })
    }
}

impl DocumentStore for MemoryStore {
    fn find_containing(&self, needle: &str) -> Result<Vec<DocumentRecord>, StoreError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        let documents = self.read()?;
        Ok(documents
            .values()
            .filter(|doc| doc.qualifies() && contains_literal(&doc.content, needle))
            .map(Document::record)
            .collect())
    }

    fn document(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn fingerprint(&self) -> Result<Fingerprint, StoreError> {
        let documents = self.read()?;
        let mut builder = FingerprintBuilder::new();
        builder.u64(documents.len() as u64);
        for doc in documents.values() {
            builder.u64(doc.id.get()).str(&doc.title).str(&doc.content);
            builder.str(&format!("{:?}/{:?}", doc.kind, doc.status));
        }
        Ok(builder.finish())
    }
}
