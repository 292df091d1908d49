//! Schema introspection sources.

pub mod adapter;
pub mod options;
pub mod postgres;

pub use adapter::{SchemaSource, SnapshotSource};
pub use options::IntrospectOptions;
pub use postgres::{PostgresSchemaSource, introspect_postgres};

pub use seedwright_core::RawTable;
