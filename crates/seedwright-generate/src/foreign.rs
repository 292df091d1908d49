use std::collections::BTreeMap;

use rand::RngCore;
use rand::seq::IndexedRandom;

use seedwright_core::TableMetadata;

use crate::generators::{GeneratedRecord, GeneratedValue};

#[derive(Debug, Clone, Default)]
struct PoolEntry {
    primary_key: Option<String>,
    records: Vec<GeneratedRecord>,
}

/// Records generated so far, keyed by table, used to draw foreign-key values.
#[derive(Debug, Clone, Default)]
pub struct ForeignKeyPool {
    tables: BTreeMap<String, PoolEntry>,
}

impl ForeignKeyPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table's records, remembering its primary key column.
    pub fn ingest(&mut self, table: &TableMetadata, records: &[GeneratedRecord]) {
        let entry = self.tables.entry(table.name.clone()).or_default();
        entry.primary_key = table.primary_key.clone();
        entry.records.extend_from_slice(records);
    }

    /// Add records for `table` without key metadata.
    pub fn insert(&mut self, table: impl Into<String>, records: Vec<GeneratedRecord>) {
        self.tables
            .entry(table.into())
            .or_default()
            .records
            .extend(records);
    }

    pub fn records(&self, table: &str) -> &[GeneratedRecord] {
        self.tables
            .get(table)
            .map(|entry| entry.records.as_slice())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.values().all(|entry| entry.records.is_empty())
    }

    /// Non-null values of the referenced column across the pooled records.
    ///
    /// The referenced column is `foreign_column` when given, else the
    /// parent's primary key.
    pub fn candidates(&self, table: &str, foreign_column: Option<&str>) -> Vec<&GeneratedValue> {
        let Some(entry) = self.tables.get(table) else {
            return Vec::new();
        };
        let Some(column) = foreign_column.or(entry.primary_key.as_deref()) else {
            return Vec::new();
        };
        entry
            .records
            .iter()
            .filter_map(|record| record.get(column))
            .filter(|value| !value.is_null())
            .collect()
    }

    /// Draw a referenced value uniformly, or `None` when the pool has none.
    pub fn pick(
        &self,
        table: &str,
        foreign_column: Option<&str>,
        rng: &mut dyn RngCore,
    ) -> Option<GeneratedValue> {
        self.candidates(table, foreign_column)
            .choose(rng)
            .map(|value| (*value).clone())
    }
}
