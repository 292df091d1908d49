use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use seedwright_core::{parse_snapshot, redact_connection_string};
use seedwright_introspect::{IntrospectOptions, PostgresSchemaSource, SchemaSource, SnapshotSource};

use crate::CliError;

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Postgres connection string.
    #[arg(long, value_name = "CONNECTION_STRING")]
    pub conn: Option<String>,
    /// Schema snapshot JSON to read instead of a live database.
    #[arg(long, value_name = "PATH")]
    pub schema_file: Option<PathBuf>,
    /// Database schema to introspect.
    #[arg(long, default_value = "public")]
    pub schema: String,
    /// Table to leave out (repeatable).
    #[arg(long = "exclude-table", value_name = "TABLE")]
    pub exclude_tables: Vec<String>,
}

impl SchemaArgs {
    pub fn introspect_options(&self) -> IntrospectOptions {
        IntrospectOptions {
            exclude_tables: self.exclude_tables.clone(),
            ..IntrospectOptions::for_schema(self.schema.clone())
        }
    }
}

/// Open the schema source named by `args`: a live database or a snapshot.
pub async fn open_source(args: &SchemaArgs) -> Result<Box<dyn SchemaSource>, CliError> {
    match (&args.conn, &args.schema_file) {
        (Some(conn), None) => {
            let pool = connect_pool(conn).await?;
            Ok(Box::new(PostgresSchemaSource::new(
                pool,
                args.introspect_options(),
            )))
        }
        (None, Some(path)) => {
            let json = std::fs::read_to_string(path)?;
            let tables = parse_snapshot(&json)?;
            tracing::info!(
                event = "snapshot_loaded",
                path = %path.display(),
                tables = tables.len()
            );
            Ok(Box::new(SnapshotSource::new(tables)))
        }
        (Some(_), Some(_)) => Err(CliError::InvalidConfig(
            "use either --conn or --schema-file".to_string(),
        )),
        (None, None) => Err(CliError::InvalidConfig(
            "--conn or --schema-file is required".to_string(),
        )),
    }
}

pub async fn connect_pool(conn: &str) -> Result<PgPool, CliError> {
    let engine = detect_engine(conn)?;
    let redacted = redact_connection_string(conn);
    tracing::info!(
        event = "connecting",
        engine = %engine,
        connection = %redacted.redacted
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect(conn)
        .await?;
    Ok(pool)
}

pub fn detect_engine(conn: &str) -> Result<&'static str, CliError> {
    if conn.starts_with("postgres://") || conn.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(CliError::UnsupportedEngine(
            redact_connection_string(conn).redacted,
        ))
    }
}
