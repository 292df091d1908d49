use std::env;

use anyhow::{Context, Result};
use seedwright_introspect::{IntrospectOptions, SchemaSource, PostgresSchemaSource};
use sqlx::postgres::PgPoolOptions;

const FIXTURE: &str = r#"
drop schema if exists seedwright_it cascade;
create schema seedwright_it;
create type seedwright_it.post_status as enum ('draft', 'published');
create table seedwright_it.users (
  id serial primary key,
  email varchar(120) not null,
  nickname text
);
create table seedwright_it.posts (
  id uuid primary key,
  author_id integer not null references seedwright_it.users(id),
  status seedwright_it.post_status not null,
  tags text[]
);
"#;

fn database_url() -> Option<String> {
    env::var("SEEDWRIGHT_TEST_DATABASE_URL").ok()
}

#[tokio::test]
async fn introspects_keys_enums_and_arrays() -> Result<()> {
    let Some(db_url) = database_url() else {
        eprintln!("SEEDWRIGHT_TEST_DATABASE_URL not set; skipping");
        return Ok(());
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(10))
        .connect(&db_url)
        .await
        .context("connecting to Postgres")?;

    sqlx::raw_sql(FIXTURE)
        .execute(&pool)
        .await
        .context("loading fixture")?;

    let source = PostgresSchemaSource::new(pool, IntrospectOptions::for_schema("seedwright_it"));
    let tables = source.fetch_schema().await?;

    let names: Vec<&str> = tables.iter().map(|table| table.name.as_str()).collect();
    assert_eq!(names, vec!["posts", "users"]);

    let users = &tables[1];
    assert_eq!(users.columns[0].constraint.as_deref(), Some("PRIMARY KEY"));
    assert!(
        users.columns[0]
            .default
            .as_deref()
            .is_some_and(|default| default.starts_with("nextval("))
    );
    assert_eq!(users.columns[1].data_type, "character varying(120)");
    assert!(users.columns[2].nullable);

    let posts = &tables[0];
    assert_eq!(posts.columns[1].constraint.as_deref(), Some("FOREIGN KEY"));
    assert_eq!(posts.columns[1].foreign_table.as_deref(), Some("users"));
    assert_eq!(posts.columns[1].foreign_column.as_deref(), Some("id"));
    assert_eq!(
        posts.columns[2].enum_values.as_deref(),
        Some(&["draft".to_string(), "published".to_string()][..])
    );
    assert_eq!(posts.columns[3].data_type, "text[]");

    Ok(())
}
