use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use seedwright_core::{RawColumn, RawTable, parse_snapshot};
use seedwright_generate::{
    GenerationConfig, GenerationOptions, SqlTransport, StatementOutcome, TransportError,
    execute_mock_data_generation, generate_mock_data,
};
use seedwright_introspect::{SchemaSource, SnapshotSource};

/// Records every statement; fails the ones containing any `fail_on` marker.
#[derive(Debug, Default)]
struct RecordingTransport {
    statements: Vec<String>,
    fail_on: Vec<String>,
}

impl RecordingTransport {
    fn failing_on(markers: &[&str]) -> Self {
        Self {
            statements: Vec::new(),
            fail_on: markers.iter().map(|marker| marker.to_string()).collect(),
        }
    }
}

#[async_trait]
impl SqlTransport for RecordingTransport {
    async fn execute(&mut self, statement: &str) -> Result<StatementOutcome, TransportError> {
        self.statements.push(statement.to_string());
        if self.fail_on.iter().any(|marker| statement.contains(marker)) {
            return Err(TransportError::new(format!(
                "simulated failure for {statement:.40}"
            )));
        }
        Ok(StatementOutcome { rows_affected: 1 })
    }
}

struct UnreachableSource;

#[async_trait]
impl SchemaSource for UnreachableSource {
    fn engine(&self) -> &'static str {
        "unreachable"
    }

    async fn fetch_schema(&self) -> seedwright_core::Result<Vec<RawTable>> {
        Err(seedwright_core::Error::Db("connection refused".to_string()))
    }
}

fn options() -> GenerationOptions {
    GenerationOptions {
        seed: Some(2024),
        reference_time: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single(),
        ..GenerationOptions::default()
    }
}

fn blog_source() -> SnapshotSource {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/blog.snapshot.json");
    let json = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("missing snapshot at {}", path.display()));
    SnapshotSource::new(parse_snapshot(&json).expect("parse snapshot"))
}

fn standalone(name: &str) -> RawTable {
    RawTable::new(
        name,
        vec![
            RawColumn::new("id", "uuid").primary_key(),
            RawColumn::new("label", "text"),
        ],
    )
}

#[tokio::test]
async fn users_are_generated_before_posts() {
    let source = SnapshotSource::new(vec![
        RawTable::new(
            "posts",
            vec![
                RawColumn::new("id", "integer")
                    .primary_key()
                    .with_default("nextval('posts_id_seq'::regclass)"),
                RawColumn::new("user_id", "uuid").references("users", "id"),
            ],
        ),
        standalone("users"),
    ]);

    let data = generate_mock_data(&source, &GenerationConfig::default(), &options())
        .await
        .expect("generate");
    assert_eq!(data.summary.insertion_order, vec!["users", "posts"]);
    assert_eq!(data.data[0].table, "users");
    assert!(data.queries[0].starts_with(r#"INSERT INTO "users""#));

    let user_ids: Vec<_> = data
        .table("users")
        .expect("users")
        .iter()
        .filter_map(|record| record.get("id").cloned())
        .collect();
    for post in data.table("posts").expect("posts") {
        let user_id = post.get("user_id").expect("user_id");
        assert!(user_ids.contains(user_id));
    }
}

#[tokio::test]
async fn one_failing_table_rolls_back_and_fails_the_run() {
    let source = SnapshotSource::new(vec![standalone("users")]);
    let mut transport = RecordingTransport::failing_on(&["INSERT INTO"]);

    let report = execute_mock_data_generation(
        &source,
        &mut transport,
        &GenerationConfig::default(),
        &options(),
    )
    .await;

    assert!(!report.success);
    assert_eq!(report.summary.successful_tables, 0);
    assert_eq!(report.summary.failed_tables, 1);
    assert_eq!(report.failed_tables[0].table, "users");
    assert!(report.failed_tables[0].error.contains("simulated failure"));

    assert_eq!(transport.statements.len(), 3);
    assert_eq!(transport.statements[0], "BEGIN;");
    assert!(transport.statements[1].starts_with("INSERT INTO"));
    assert_eq!(transport.statements[2], "ROLLBACK;");
}

#[tokio::test]
async fn independent_tables_fail_in_isolation() {
    let source = SnapshotSource::new(vec![standalone("teams"), standalone("badges")]);
    let mut transport = RecordingTransport::failing_on(&[r#"INSERT INTO "badges""#]);

    let report = execute_mock_data_generation(
        &source,
        &mut transport,
        &GenerationConfig::default().with_count("teams", 4),
        &options(),
    )
    .await;

    assert!(report.success);
    assert_eq!(report.summary.tables_processed, 2);
    assert_eq!(report.summary.successful_tables, 1);
    assert_eq!(report.summary.failed_tables, 1);
    assert_eq!(report.summary.total_records, 4);
    assert_eq!(report.successful_tables[0].table, "teams");
    assert!(report.message.starts_with("partially completed"));
    assert_eq!(
        transport.statements.iter().filter(|s| *s == "COMMIT;").count(),
        1
    );
}

#[tokio::test]
async fn empty_schema_is_not_a_success() {
    let source = SnapshotSource::new(Vec::new());
    let mut transport = RecordingTransport::default();

    let report = execute_mock_data_generation(
        &source,
        &mut transport,
        &GenerationConfig::default(),
        &options(),
    )
    .await;

    assert!(!report.success);
    assert_eq!(report.summary.tables_processed, 0);
    assert_eq!(report.summary.total_records, 0);
    assert!(transport.statements.is_empty());
}

#[tokio::test]
async fn schema_fetch_failure_is_reported() {
    let mut transport = RecordingTransport::default();
    let report = execute_mock_data_generation(
        &UnreachableSource,
        &mut transport,
        &GenerationConfig::default(),
        &options(),
    )
    .await;

    assert!(!report.success);
    assert!(report.error.as_deref().is_some_and(|err| err.contains("connection refused")));
    assert!(transport.statements.is_empty());

    let err = generate_mock_data(&UnreachableSource, &GenerationConfig::default(), &options())
        .await
        .expect_err("fetch should fail");
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn zero_record_tables_commit_without_insert() {
    let source = SnapshotSource::new(vec![standalone("users")]);
    let mut transport = RecordingTransport::default();

    let report = execute_mock_data_generation(
        &source,
        &mut transport,
        &GenerationConfig::default().with_count("users", 0),
        &options(),
    )
    .await;

    assert!(report.success);
    assert_eq!(report.successful_tables[0].records, 0);
    assert_eq!(transport.statements, vec!["BEGIN;", "COMMIT;"]);
}

#[tokio::test]
async fn failed_commit_is_rolled_back() {
    let source = SnapshotSource::new(vec![standalone("users")]);
    let mut transport = RecordingTransport::failing_on(&["COMMIT;"]);

    let report = execute_mock_data_generation(
        &source,
        &mut transport,
        &GenerationConfig::default(),
        &options(),
    )
    .await;

    assert!(!report.success);
    assert!(report.failed_tables[0].error.starts_with("commit failed"));
    assert_eq!(transport.statements.last().map(String::as_str), Some("ROLLBACK;"));
}

#[tokio::test]
async fn failed_parents_stay_out_of_the_pool() {
    let mut transport = RecordingTransport::failing_on(&[r#"INSERT INTO "users""#]);
    let report = execute_mock_data_generation(
        &blog_source(),
        &mut transport,
        &GenerationConfig::default(),
        &options(),
    )
    .await;

    assert!(report.success);
    let failed: Vec<_> = report.failed_tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(failed, vec!["users"]);
    assert_eq!(report.summary.successful_tables, 2);

    // The preview run (all tables succeed) draws author ids from users; the
    // executed run could not, so its posts insert differs.
    let preview = generate_mock_data(&blog_source(), &GenerationConfig::default(), &options())
        .await
        .expect("preview");
    let executed_posts = transport
        .statements
        .iter()
        .find(|s| s.starts_with(r#"INSERT INTO "posts""#))
        .expect("posts insert");
    let preview_posts = preview
        .queries
        .iter()
        .find(|s| s.starts_with(r#"INSERT INTO "posts""#))
        .expect("posts query");
    assert_ne!(executed_posts, preview_posts);
}

#[tokio::test]
async fn seeded_runs_are_reproducible() {
    let config = GenerationConfig::default().with_count("comments", 25);
    let first = generate_mock_data(&blog_source(), &config, &options())
        .await
        .expect("first run");
    let second = generate_mock_data(&blog_source(), &config, &options())
        .await
        .expect("second run");

    assert_eq!(first.queries, second.queries);
    assert_eq!(first.summary.seed, 2024);
    assert_eq!(first.summary.insertion_order, vec!["users", "posts", "comments"]);
    assert_eq!(first.summary.record_counts.get("comments"), Some(&25));
    assert_eq!(first.summary.total_records, 45);

    let other = GenerationOptions {
        seed: Some(7),
        ..options()
    };
    let third = generate_mock_data(&blog_source(), &config, &other)
        .await
        .expect("third run");
    assert_ne!(first.queries, third.queries);
}

#[tokio::test]
async fn blog_snapshot_values_follow_column_types() {
    let data = generate_mock_data(&blog_source(), &GenerationConfig::default(), &options())
        .await
        .expect("generate");

    for post in data.table("posts").expect("posts") {
        assert!(post.get("id").is_none());
        let status = post.get("status").and_then(|v| v.as_str()).expect("status");
        assert!(["draft", "published", "archived"].contains(&status));
        if let Some(tags) = post.get("tags").filter(|v| !v.is_null()) {
            let tags = tags.as_array().expect("array");
            assert!((1..=5).contains(&tags.len()));
        }
        if let Some(meta) = post.get("metadata").and_then(|v| v.as_str()) {
            let parsed: serde_json::Value = serde_json::from_str(meta).expect("json text");
            assert!(parsed.get("created_by").is_some());
        }
    }
    for user in data.table("users").expect("users") {
        let created = user.get("created_at").and_then(|v| v.as_str()).expect("created_at");
        assert!(created.ends_with("+00:00"));
        assert!(created <= "2024-05-01T12:00:00+00:00");
    }
}
