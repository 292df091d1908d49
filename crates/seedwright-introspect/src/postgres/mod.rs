use sqlx::PgPool;
use tracing::{debug, info};

use seedwright_core::{RawTable, Result};

use crate::adapter::SchemaSource;
use crate::options::IntrospectOptions;

mod mapper;
mod queries;

/// Schema source reading a live PostgreSQL catalog.
#[derive(Debug, Clone)]
pub struct PostgresSchemaSource {
    pool: PgPool,
    options: IntrospectOptions,
}

impl PostgresSchemaSource {
    /// Create a source using a pre-configured pool.
    pub fn new(pool: PgPool, options: IntrospectOptions) -> Self {
        Self { pool, options }
    }
}

#[async_trait::async_trait]
impl SchemaSource for PostgresSchemaSource {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn fetch_schema(&self) -> Result<Vec<RawTable>> {
        introspect_postgres(&self.pool, &self.options).await
    }
}

/// Introspect the base tables of one Postgres schema.
pub async fn introspect_postgres(pool: &PgPool, opts: &IntrospectOptions) -> Result<Vec<RawTable>> {
    let columns = queries::list_columns(pool, &opts.schema).await?;
    let keys = queries::list_key_columns(pool, &opts.schema).await?;
    let enums = queries::list_enum_labels(pool).await?;
    debug!(
        schema = %opts.schema,
        columns = columns.len(),
        key_columns = keys.len(),
        enum_types = enums.len(),
        "catalog rows fetched"
    );

    let tables = mapper::map_tables(columns, &keys, &enums, opts);
    info!(schema = %opts.schema, tables = tables.len(), "schema introspected");
    Ok(tables)
}
