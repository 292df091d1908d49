//! Core contracts for Seedwright.
//!
//! This crate defines the introspected schema snapshot, the analyzed
//! dependency graph and the insertion ordering shared by the generator,
//! the introspection adapters and the CLI.

pub mod error;
pub mod graph;
pub mod redaction;
pub mod schema;
pub mod types;

pub use error::{Error, Result};
pub use graph::{
    ForeignKeyRef, InsertionOrder, SchemaGraph, SkippedEdge, TableMetadata, analyze_schema,
};
pub use redaction::{RedactedConnection, redact_connection_string};
pub use schema::{
    ColumnConstraint, ColumnMetadata, IdentityGeneration, RawColumn, RawTable, parse_snapshot,
};
pub use types::{ColumnKind, declared_length};
