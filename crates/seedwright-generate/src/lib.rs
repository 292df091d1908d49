//! Synthetic data generation for Seedwright.
//!
//! Tables are generated in foreign-key order, rendered as batched `INSERT`
//! statements and optionally written one transaction per table.

pub mod config;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod foreign;
pub mod generators;
pub mod model;
pub mod records;
pub mod sql;

pub use config::{ColumnOptions, DEFAULT_RECORD_COUNT, GenerationConfig, TableConfig};
pub use engine::{MockDataEngine, analyze, execute_mock_data_generation, generate_mock_data};
pub use errors::GenerationError;
pub use executor::{
    PostgresTransport, SqlTransport, StatementOutcome, TableInsertError, TransportError,
    insert_in_transaction,
};
pub use foreign::ForeignKeyPool;
pub use generators::{GeneratedRecord, GeneratedValue};
pub use model::{
    ExecutionReport, ExecutionSummary, GenerationOptions, GenerationSummary, MockDataSet,
    TableData, TableFailure, TableSuccess,
};
pub use records::{TableOptions, generate_table_data};
pub use sql::{build_insert, quote_identifier, render_literal};
