use async_trait::async_trait;

use seedwright_core::{RawTable, Result};

/// Anything that can produce a raw schema snapshot.
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Fetch the tables of the target schema with their columns.
    async fn fetch_schema(&self) -> Result<Vec<RawTable>>;
}

/// Source backed by an already captured snapshot (a JSON file, a fixture).
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    tables: Vec<RawTable>,
}

impl SnapshotSource {
    pub fn new(tables: Vec<RawTable>) -> Self {
        Self { tables }
    }
}

#[async_trait]
impl SchemaSource for SnapshotSource {
    fn engine(&self) -> &'static str {
        "snapshot"
    }

    async fn fetch_schema(&self) -> Result<Vec<RawTable>> {
        Ok(self.tables.clone())
    }
}
