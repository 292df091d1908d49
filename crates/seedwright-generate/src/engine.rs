use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use seedwright_core::{SchemaGraph, TableMetadata, analyze_schema};
use seedwright_introspect::SchemaSource;

use crate::config::GenerationConfig;
use crate::errors::GenerationError;
use crate::executor::{SqlTransport, insert_in_transaction};
use crate::foreign::ForeignKeyPool;
use crate::generators::GeneratedRecord;
use crate::model::{ExecutionReport, GenerationOptions, GenerationSummary, MockDataSet, TableData};
use crate::records::{TableOptions, generate_table_data};
use crate::sql::build_insert;

/// Fetch a snapshot from `source` and build its dependency graph.
pub async fn analyze<S: SchemaSource + ?Sized>(source: &S) -> Result<SchemaGraph, GenerationError> {
    let tables = source.fetch_schema().await?;
    Ok(analyze_schema(&tables))
}

/// Generate data and `INSERT` statements for every table without writing.
pub async fn generate_mock_data<S: SchemaSource + ?Sized>(
    source: &S,
    config: &GenerationConfig,
    options: &GenerationOptions,
) -> Result<MockDataSet, GenerationError> {
    let graph = analyze(source).await?;
    Ok(MockDataEngine::new(config.clone(), options).generate(&graph))
}

/// Generate data and insert it table by table, one transaction per table.
///
/// Never fails: a schema fetch error ends the run with `success == false`
/// and the message in `error`; table failures are recorded and skipped.
pub async fn execute_mock_data_generation<S, T>(
    source: &S,
    transport: &mut T,
    config: &GenerationConfig,
    options: &GenerationOptions,
) -> ExecutionReport
where
    S: SchemaSource + ?Sized,
    T: SqlTransport + ?Sized,
{
    let engine = MockDataEngine::new(config.clone(), options);
    let run_id = uuid::Uuid::new_v4().to_string();

    match analyze(source).await {
        Ok(graph) => engine.execute(&graph, transport, run_id).await,
        Err(err) => {
            warn!(run_id = %run_id, error = %err, "schema fetch failed");
            let mut report = ExecutionReport::new(run_id, Some(engine.seed()));
            report.fail(err.to_string());
            report
        }
    }
}

/// Generation run with its seed and reference time resolved.
#[derive(Debug, Clone)]
pub struct MockDataEngine {
    config: GenerationConfig,
    seed: u64,
    null_probability: f64,
    reference_time: DateTime<Utc>,
}

impl MockDataEngine {
    pub fn new(config: GenerationConfig, options: &GenerationOptions) -> Self {
        Self {
            config,
            seed: options.seed.unwrap_or_else(rand::random),
            null_probability: options.null_probability,
            reference_time: options.reference_time.unwrap_or_else(Utc::now),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn reference_time(&self) -> DateTime<Utc> {
        self.reference_time
    }

    /// Generate every table in insertion order, threading each table's
    /// records into the foreign-key pool for the tables after it.
    pub fn generate(&self, graph: &SchemaGraph) -> MockDataSet {
        let ordering = graph.ordering();
        let mut pool = ForeignKeyPool::new();
        let mut data = Vec::with_capacity(ordering.tables.len());
        let mut queries = Vec::new();
        let mut record_counts = BTreeMap::new();

        for table in ordering.tables.iter().filter_map(|name| graph.table(name)) {
            let records = self.generate_table(table, &pool);
            if let Some(query) = build_insert(&table.name, &records) {
                queries.push(query);
            }
            pool.ingest(table, &records);
            record_counts.insert(table.name.clone(), records.len());
            data.push(TableData {
                table: table.name.clone(),
                records,
            });
        }

        let total_records = record_counts.values().sum();
        info!(
            seed = self.seed,
            tables = data.len(),
            records = total_records,
            "mock data generated"
        );

        MockDataSet {
            data,
            queries,
            summary: GenerationSummary {
                seed: self.seed,
                reference_time: self.reference_time,
                insertion_order: ordering.tables,
                skipped_edges: ordering.skipped_edges,
                record_counts,
                total_records,
            },
        }
    }

    /// Generate and insert every table in insertion order. Records of
    /// tables that failed to commit stay out of the foreign-key pool.
    pub async fn execute<T: SqlTransport + ?Sized>(
        &self,
        graph: &SchemaGraph,
        transport: &mut T,
        run_id: String,
    ) -> ExecutionReport {
        let mut report = ExecutionReport::new(run_id, Some(self.seed));
        let order = graph.insertion_order();
        info!(
            run_id = %report.run_id,
            seed = self.seed,
            tables = order.len(),
            "mock data run started"
        );

        let mut pool = ForeignKeyPool::new();
        for table in order.iter().filter_map(|name| graph.table(name)) {
            let records = self.generate_table(table, &pool);
            let insert = build_insert(&table.name, &records);

            match insert_in_transaction(transport, &table.name, insert.as_deref()).await {
                Ok(_) => {
                    info!(table = %table.name, records = records.len(), "table committed");
                    report.record_success(&table.name, records.len());
                    pool.ingest(table, &records);
                }
                Err(err) => {
                    warn!(table = %table.name, error = %err, "table rolled back");
                    report.record_failure(&table.name, err.to_string());
                }
            }
        }

        report.finish();
        info!(
            run_id = %report.run_id,
            success = report.success,
            successful_tables = report.summary.successful_tables,
            failed_tables = report.summary.failed_tables,
            records = report.summary.total_records,
            "mock data run finished"
        );
        report
    }

    fn generate_table(&self, table: &TableMetadata, pool: &ForeignKeyPool) -> Vec<GeneratedRecord> {
        let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(self.seed, &table.name));
        let options = TableOptions::new(self.reference_naive())
            .with_config(self.config.table(&table.name))
            .with_null_probability(self.null_probability);
        generate_table_data(
            table,
            self.config.count_for(&table.name),
            &options,
            pool,
            &mut rng,
        )
    }

    fn reference_naive(&self) -> NaiveDateTime {
        self.reference_time.naive_utc()
    }
}

/// Per-table seed derived from the run seed (FNV-1a over the table name).
fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
