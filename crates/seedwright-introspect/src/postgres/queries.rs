use std::collections::BTreeMap;

use sqlx::{PgPool, Row};

use seedwright_core::{Error, Result};

pub struct CatalogColumn {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    pub udt_name: String,
    pub udt_schema: String,
    pub character_max_length: Option<i32>,
    pub numeric_precision: Option<i32>,
    pub numeric_scale: Option<i32>,
    pub is_nullable: bool,
    pub default: Option<String>,
    pub identity_generation: Option<String>,
}

pub async fn list_columns(pool: &PgPool, schema: &str) -> Result<Vec<CatalogColumn>> {
    let rows = sqlx::query(
        r#"
        select
          c.table_name::text as table_name,
          c.column_name::text as column_name,
          c.data_type::text as data_type,
          c.udt_name::text as udt_name,
          c.udt_schema::text as udt_schema,
          c.character_maximum_length::int4 as character_max_length,
          c.numeric_precision::int4 as numeric_precision,
          c.numeric_scale::int4 as numeric_scale,
          (c.is_nullable = 'YES') as is_nullable,
          c.column_default::text as column_default,
          case when c.is_identity = 'YES' then c.identity_generation::text end
            as identity_generation
        from information_schema.columns c
        join information_schema.tables t
          on t.table_schema = c.table_schema
         and t.table_name = c.table_name
        where c.table_schema = $1
          and t.table_type = 'BASE TABLE'
        order by c.table_name, c.ordinal_position
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    rows.iter()
        .map(|row| -> Result<CatalogColumn> {
            Ok(CatalogColumn {
                table_name: row.try_get("table_name").map_err(db_error)?,
                column_name: row.try_get("column_name").map_err(db_error)?,
                data_type: row.try_get("data_type").map_err(db_error)?,
                udt_name: row.try_get("udt_name").map_err(db_error)?,
                udt_schema: row.try_get("udt_schema").map_err(db_error)?,
                character_max_length: row.try_get("character_max_length").map_err(db_error)?,
                numeric_precision: row.try_get("numeric_precision").map_err(db_error)?,
                numeric_scale: row.try_get("numeric_scale").map_err(db_error)?,
                is_nullable: row.try_get("is_nullable").map_err(db_error)?,
                default: row.try_get("column_default").map_err(db_error)?,
                identity_generation: row.try_get("identity_generation").map_err(db_error)?,
            })
        })
        .collect()
}

/// One column taking part in a primary or foreign key.
pub struct KeyColumn {
    pub table_name: String,
    pub column_name: String,
    /// `p` or `f`, as in `pg_constraint.contype`.
    pub contype: String,
    pub foreign_table: Option<String>,
    pub foreign_column: Option<String>,
}

pub async fn list_key_columns(pool: &PgPool, schema: &str) -> Result<Vec<KeyColumn>> {
    let rows = sqlx::query(
        r#"
        select
          cl.relname::text as table_name,
          a.attname::text as column_name,
          con.contype::text as contype,
          fcl.relname::text as foreign_table,
          fa.attname::text as foreign_column
        from pg_constraint con
        join pg_class cl on cl.oid = con.conrelid
        join pg_namespace n on n.oid = cl.relnamespace
        cross join lateral unnest(con.conkey) with ordinality as k(attnum, ord)
        join pg_attribute a on a.attrelid = con.conrelid and a.attnum = k.attnum
        left join pg_class fcl on fcl.oid = con.confrelid
        left join pg_attribute fa
          on fa.attrelid = con.confrelid
         and fa.attnum = con.confkey[k.ord]
        where n.nspname = $1
          and con.contype in ('p', 'f')
        order by cl.relname, con.conname, k.ord
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    rows.iter()
        .map(|row| -> Result<KeyColumn> {
            Ok(KeyColumn {
                table_name: row.try_get("table_name").map_err(db_error)?,
                column_name: row.try_get("column_name").map_err(db_error)?,
                contype: row.try_get("contype").map_err(db_error)?,
                foreign_table: row.try_get("foreign_table").map_err(db_error)?,
                foreign_column: row.try_get("foreign_column").map_err(db_error)?,
            })
        })
        .collect()
}

/// Enum type name -> labels in declaration order.
/// Enum labels in sort order, keyed by schema-qualified type name.
pub async fn list_enum_labels(pool: &PgPool) -> Result<BTreeMap<String, Vec<String>>> {
    let rows = sqlx::query(
        r#"
        select n.nspname::text as type_schema, t.typname::text as type_name,
               e.enumlabel::text as label
        from pg_type t
        join pg_namespace n on n.oid = t.typnamespace
        join pg_enum e on e.enumtypid = t.oid
        order by n.nspname, t.typname, e.enumsortorder
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(db_error)?;

    let mut enums: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in &rows {
        let type_schema: String = row.try_get("type_schema").map_err(db_error)?;
        let type_name: String = row.try_get("type_name").map_err(db_error)?;
        let label: String = row.try_get("label").map_err(db_error)?;
        enums
            .entry(qualified_type_name(&type_schema, &type_name))
            .or_default()
            .push(label);
    }
    Ok(enums)
}

pub fn qualified_type_name(schema: &str, name: &str) -> String {
    format!("{schema}.{name}")
}

fn db_error(err: sqlx::Error) -> Error {
    Error::Db(err.to_string())
}
