//! Per-module occurrence scanning.

use super::UsageIndex;
use super::marker::{Marker, MatchMode};
use crate::store::DocumentStore;
use crate::types::{ModuleId, UsageRecord};
use std::time::Instant;

/// Computes usage records by querying the store once per module.
pub struct OccurrenceScanner<'a> {
    store: &'a dyn DocumentStore,
    mode: MatchMode,
}

impl<'a> OccurrenceScanner<'a> {
    pub fn new(store: &'a dyn DocumentStore, mode: MatchMode) -> Self {
        Self { store, mode }
    }

    /// Scan every module in `modules`, keeping their order.
    ///
    /// A failed store query only affects its own module, which is reported with
    /// an empty record.
    pub fn scan<'m, I>(&self, modules: I) -> UsageIndex
    where
        I: IntoIterator<Item = &'m ModuleId>,
    {
        let started = Instant::now();
        let mut index = UsageIndex::default();
        for module in modules {
            if index.contains(module.as_str()) {
                continue;
            }
            index.insert(self.scan_module(module));
        }

        tracing::debug!(
            "Scanned {} modules ({} occurrences) in {:?}",
            index.len(),
            index.total_occurrences(),
            started.elapsed()
        );
        index
    }

    /// Usage of a single module.
    pub fn scan_module(&self, module: &ModuleId) -> UsageRecord {
        let marker = Marker::for_module(module, self.mode);
        let mut record = UsageRecord::empty(module.clone());

        let candidates = match self.store.find_containing(marker.as_str()) {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!("Store query for module '{}' failed, reporting no usage: {}", module, e);
                return record;
            }
        };

        for document in candidates {
            record.record(document.id, marker.count_in(&document.content));
        }
        record
    }
}
