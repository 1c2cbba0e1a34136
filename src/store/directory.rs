//! Document store over a directory of JSON exports.
//!
//! Every `*.json` file under the root holds either one document or an array of
//! documents. The tree is walked afresh on each query in path order, so
//! results are deterministic and always reflect the files as they are now.

use super::{DocumentStore, contains_literal};
use crate::error::StoreError;
use crate::fingerprint::{Fingerprint, FingerprintBuilder};
use crate::types::{Document, DocumentId, DocumentRecord};
use ignore::WalkBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentFile {
    One(Document),
    Many(Vec<Document>),
}

impl DocumentFile {
    fn into_documents(self) -> Vec<Document> {
        match self {
            Self::One(document) => vec![document],
            Self::Many(documents) => documents,
        }
    }
}

/// A corpus stored as JSON files under a directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All JSON files under the root, sorted by path.
    fn json_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::Unreachable {
                reason: format!("content directory {} does not exist", self.root.display()),
            });
        }

        // Every export counts, including dot-files and paths named in ignore files
        let mut files: Vec<PathBuf> = WalkBuilder::new(&self.root)
            .standard_filters(false)
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry under {}: {}", self.root.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
            .map(ignore::DirEntry::into_path)
            .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();

        files.sort();
        Ok(files)
    }

    fn read_file(path: &Path) -> Result<Vec<Document>, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file: DocumentFile = serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(file.into_documents())
    }

    /// Documents in one file, or nothing if the file is unusable.
    fn read_file_lenient(path: &Path) -> Vec<Document> {
        match Self::read_file(path) {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!("Skipping document file: {}", e);
                Vec::new()
            }
        }
    }
}

impl DocumentStore for DirectoryStore {
    fn find_containing(&self, needle: &str) -> Result<Vec<DocumentRecord>, StoreError> {
        let mut records = Vec::new();
        for path in self.json_files()? {
            records.extend(
                Self::read_file_lenient(&path)
                    .into_iter()
                    .filter(|doc| doc.qualifies() && contains_literal(&doc.content, needle))
                    .map(|doc| DocumentRecord {
                        id: doc.id,
                        content: doc.content,
                    }),
            );
        }
        Ok(records)
    }

    fn document(&self, id: DocumentId) -> Result<Option<Document>, StoreError> {
        // Exports are conventionally named after the document id.
        let direct = self.root.join(format!("{}.json", id));
        if direct.is_file()
            && let Some(found) = Self::read_file_lenient(&direct)
                .into_iter()
                .find(|doc| doc.id == id)
        {
            return Ok(Some(found));
        }

        for path in self.json_files()? {
            if let Some(found) = Self::read_file_lenient(&path)
                .into_iter()
                .find(|doc| doc.id == id)
            {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    fn fingerprint(&self) -> Result<Fingerprint, StoreError> {
        let mut builder = FingerprintBuilder::new();
        for path in self.json_files()? {
            // Hash the relative path so the fingerprint survives moving the corpus
            if let Ok(rel_path) = path.strip_prefix(&self.root) {
                builder.str(&rel_path.to_string_lossy());
            }
            match std::fs::read(&path) {
                Ok(bytes) => {
                    builder.bytes(&bytes);
                }
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        }
        Ok(builder.finish())
    }
}
