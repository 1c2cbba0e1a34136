//! Core value types shared across the scanner, views and stores.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a content-block module, as published by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ModuleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Identifier of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(u64);

impl DocumentId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a stored document. Only pages and posts are scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Page,
    Post,
    #[serde(other)]
    Other,
}

/// Publication state of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    Trash,
    #[serde(other)]
    Other,
}

/// A document as held by a [`DocumentStore`](crate::store::DocumentStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub status: DocumentStatus,
    #[serde(default)]
    pub content: String,
}

impl Document {
    /// Whether the document belongs to the scanned corpus (published page or post).
    pub fn qualifies(&self) -> bool {
        matches!(self.kind, DocumentKind::Page | DocumentKind::Post)
            && self.status == DocumentStatus::Publish
    }

    pub fn record(&self) -> DocumentRecord {
        DocumentRecord {
            id: self.id,
            content: self.content.clone(),
        }
    }
}

/// The `(id, body)` projection returned by store queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub content: String,
}

/// Aggregated usage of one module across the corpus.
///
/// `count` is the total number of marker occurrences, `pages` the distinct
/// documents holding at least one. `count >= pages.len()` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageRecord {
    pub name: ModuleId,
    pub count: u64,
    pub pages: IndexSet<DocumentId>,
}

impl UsageRecord {
    pub fn empty(name: ModuleId) -> Self {
        Self {
            name,
            count: 0,
            pages: IndexSet::new(),
        }
    }

    /// Add `occurrences` found in `document`. Zero occurrences leave the record untouched.
    pub fn record(&mut self, document: DocumentId, occurrences: u64) {
        if occurrences == 0 {
            return;
        }
        self.count += occurrences;
        self.pages.insert(document);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Presentation metadata for one document listed in a detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDetail {
    pub id: DocumentId,
    pub title: String,
    pub link: String,
}
