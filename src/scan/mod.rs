//! Occurrence scanning and the aggregated usage index.

pub mod marker;
pub mod scanner;

pub use marker::{Marker, MatchMode};
pub use scanner::OccurrenceScanner;

use crate::types::{ModuleId, UsageRecord};
use indexmap::IndexMap;
use serde::Serialize;

/// Usage records of one scan, keyed by module and kept in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UsageIndex {
    records: IndexMap<ModuleId, UsageRecord>,
}

impl UsageIndex {
    /// Insert a record, replacing any previous record for the same module.
    pub fn insert(&mut self, record: UsageRecord) {
        self.records.insert(record.name.clone(), record);
    }

    pub fn get(&self, module: &str) -> Option<&UsageRecord> {
        self.records.get(module)
    }

    pub fn contains(&self, module: &str) -> bool {
        self.records.contains_key(module)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in registry order.
    pub fn records(&self) -> impl Iterator<Item = &UsageRecord> {
        self.records.values()
    }

    pub fn module_ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.records.keys()
    }

    pub fn total_occurrences(&self) -> u64 {
        self.records.values().map(|record| record.count).sum()
    }
}

impl FromIterator<UsageRecord> for UsageIndex {
    fn from_iter<T: IntoIterator<Item = UsageRecord>>(iter: T) -> Self {
        let mut index = Self::default();
        for record in iter {
            index.insert(record);
        }
        index
    }
}
