use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::postgres::PgQueryResult;
use sqlx::{Connection, PgConnection};
use thiserror::Error;
use tracing::{debug, warn};

use crate::sql::quote_identifier;

pub const BEGIN: &str = "BEGIN;";
pub const COMMIT: &str = "COMMIT;";
pub const ROLLBACK: &str = "ROLLBACK;";

/// Result of a single executed statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatementOutcome {
    pub rows_affected: u64,
}

/// Failure reported by a SQL transport, carrying the driver's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<sqlx::Error> for TransportError {
    fn from(err: sqlx::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Executes raw SQL statements on a single session, so that `BEGIN` and
/// `COMMIT` scope the statements sent between them.
#[async_trait]
pub trait SqlTransport: Send {
    async fn execute(&mut self, statement: &str) -> Result<StatementOutcome, TransportError>;
}

/// Why a table's transaction did not commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableInsertError {
    #[error("begin failed: {0}")]
    Begin(TransportError),
    #[error("insert failed: {0}")]
    Insert(TransportError),
    #[error("commit failed: {0}")]
    Commit(TransportError),
}

/// Run `insert` inside `BEGIN`/`COMMIT`, rolling back when it fails.
///
/// With no statement the transaction is committed empty.
pub async fn insert_in_transaction<T: SqlTransport + ?Sized>(
    transport: &mut T,
    table: &str,
    insert: Option<&str>,
) -> Result<StatementOutcome, TableInsertError> {
    transport
        .execute(BEGIN)
        .await
        .map_err(TableInsertError::Begin)?;

    let mut outcome = StatementOutcome::default();
    if let Some(statement) = insert {
        match transport.execute(statement).await {
            Ok(result) => outcome = result,
            Err(err) => {
                rollback(transport, table).await;
                return Err(TableInsertError::Insert(err));
            }
        }
    }

    if let Err(err) = transport.execute(COMMIT).await {
        rollback(transport, table).await;
        return Err(TableInsertError::Commit(err));
    }

    debug!(table = %table, rows = outcome.rows_affected, "transaction committed");
    Ok(outcome)
}

async fn rollback<T: SqlTransport + ?Sized>(transport: &mut T, table: &str) {
    if let Err(err) = transport.execute(ROLLBACK).await {
        warn!(table = %table, error = %err, "rollback failed");
    }
}

/// Transport over one dedicated Postgres connection.
#[derive(Debug)]
pub struct PostgresTransport {
    conn: PgConnection,
}

impl PostgresTransport {
    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }

    pub async fn connect(url: &str) -> Result<Self, TransportError> {
        Ok(Self::new(PgConnection::connect(url).await?))
    }

    /// Point unqualified table names at `schema` for the rest of the session.
    pub async fn set_search_path(&mut self, schema: &str) -> Result<(), TransportError> {
        let statement = format!("SET search_path TO {};", quote_identifier(schema));
        self.execute(&statement).await?;
        debug!(schema = %schema, "search path set");
        Ok(())
    }

    pub async fn close(self) -> Result<(), TransportError> {
        self.conn.close().await?;
        Ok(())
    }
}

#[async_trait]
impl SqlTransport for PostgresTransport {
    async fn execute(&mut self, statement: &str) -> Result<StatementOutcome, TransportError> {
        let result = execute_raw(&mut self.conn, statement).await?;
        Ok(StatementOutcome {
            rows_affected: result.rows_affected(),
        })
    }
}

type RawExecution<'c> = Pin<Box<dyn Future<Output = Result<PgQueryResult, sqlx::Error>> + Send + 'c>>;

/// Run `statement` through `sqlx::Executor` with the connection lifetime
/// pinned, which `async_trait` cannot infer for `RawSql::execute`.
fn execute_raw<'c>(conn: &'c mut PgConnection, statement: &'c str) -> RawExecution<'c> {
    Box::pin(sqlx::Executor::execute(conn, sqlx::raw_sql(statement)))
}
