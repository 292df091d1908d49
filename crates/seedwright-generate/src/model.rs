use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use seedwright_core::SkippedEdge;

use crate::generators::GeneratedRecord;

/// Null probability applied to nullable columns by default.
pub const DEFAULT_NULL_PROBABILITY: f64 = 0.1;

/// Options for a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    /// Run seed; a random one is drawn and reported when absent.
    pub seed: Option<u64>,
    /// Probability that a nullable column is `NULL` in a record.
    pub null_probability: f64,
    /// Upper bound of default date ranges; the current time when absent.
    pub reference_time: Option<DateTime<Utc>>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            seed: None,
            null_probability: DEFAULT_NULL_PROBABILITY,
            reference_time: None,
        }
    }
}

impl GenerationOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Summary of a generation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationSummary {
    pub seed: u64,
    pub reference_time: DateTime<Utc>,
    pub insertion_order: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_edges: Vec<SkippedEdge>,
    pub record_counts: BTreeMap<String, usize>,
    pub total_records: usize,
}

/// Generated records for a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableData {
    pub table: String,
    pub records: Vec<GeneratedRecord>,
}

/// Output of a generation pass that writes nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockDataSet {
    /// Tables in insertion order.
    pub data: Vec<TableData>,
    /// One `INSERT` per table that produced records.
    pub queries: Vec<String>,
    pub summary: GenerationSummary,
}

impl MockDataSet {
    pub fn table(&self, name: &str) -> Option<&[GeneratedRecord]> {
        self.data
            .iter()
            .find(|table| table.table == name)
            .map(|table| table.records.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSuccess {
    pub table: String,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableFailure {
    pub table: String,
    pub error: String,
}

/// Aggregate counts of an execution run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionSummary {
    pub tables_processed: usize,
    pub successful_tables: usize,
    pub failed_tables: usize,
    pub total_records: usize,
}

/// Report of a generate-and-insert run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionReport {
    pub run_id: String,
    /// True when at least one table was committed.
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub successful_tables: Vec<TableSuccess>,
    pub failed_tables: Vec<TableFailure>,
    pub summary: ExecutionSummary,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionReport {
    pub(crate) fn new(run_id: String, seed: Option<u64>) -> Self {
        Self {
            run_id,
            success: false,
            seed,
            successful_tables: Vec::new(),
            failed_tables: Vec::new(),
            summary: ExecutionSummary::default(),
            message: String::new(),
            error: None,
        }
    }

    pub(crate) fn record_success(&mut self, table: &str, records: usize) {
        self.summary.tables_processed += 1;
        self.summary.successful_tables += 1;
        self.summary.total_records += records;
        self.successful_tables.push(TableSuccess {
            table: table.to_string(),
            records,
        });
    }

    pub(crate) fn record_failure(&mut self, table: &str, error: String) {
        self.summary.tables_processed += 1;
        self.summary.failed_tables += 1;
        self.failed_tables.push(TableFailure {
            table: table.to_string(),
            error,
        });
    }

    /// Set `success` and `message` from the recorded outcomes.
    pub(crate) fn finish(&mut self) {
        let summary = &self.summary;
        self.success = summary.successful_tables > 0;
        self.message = if summary.tables_processed == 0 {
            "no tables found to populate".to_string()
        } else if summary.failed_tables == 0 {
            format!(
                "inserted {} records into {} tables",
                summary.total_records, summary.successful_tables
            )
        } else if summary.successful_tables == 0 {
            format!("all {} tables failed", summary.failed_tables)
        } else {
            format!(
                "partially completed: {} of {} tables populated ({} records), {} failed",
                summary.successful_tables,
                summary.tables_processed,
                summary.total_records,
                summary.failed_tables
            )
        };
    }

    pub(crate) fn fail(&mut self, error: String) {
        self.success = false;
        self.message = "mock data generation failed".to_string();
        self.error = Some(error);
    }
}
