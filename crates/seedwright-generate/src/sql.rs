//! `INSERT` rendering with typed literals.

use crate::generators::{GeneratedRecord, GeneratedValue};

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render a value as a SQL literal.
pub fn render_literal(value: &GeneratedValue) -> String {
    match value {
        GeneratedValue::Null => "NULL".to_string(),
        GeneratedValue::Bool(value) => value.to_string(),
        GeneratedValue::Int(value) => value.to_string(),
        GeneratedValue::Float(value) if value.is_finite() => value.to_string(),
        GeneratedValue::Float(_) => "NULL".to_string(),
        GeneratedValue::Text(value) => quote_string(value),
        GeneratedValue::Array(values) => quote_string(&array_literal(values)),
    }
}

/// Postgres array literal body (`{"a","b"}`), left untyped so the column
/// type decides the element type.
fn array_literal(values: &[GeneratedValue]) -> String {
    let items: Vec<String> = values.iter().map(array_element).collect();
    format!("{{{}}}", items.join(","))
}

fn array_element(value: &GeneratedValue) -> String {
    match value {
        GeneratedValue::Null => "NULL".to_string(),
        GeneratedValue::Bool(value) => value.to_string(),
        GeneratedValue::Int(value) => value.to_string(),
        GeneratedValue::Float(value) if value.is_finite() => value.to_string(),
        GeneratedValue::Float(_) => "NULL".to_string(),
        GeneratedValue::Text(value) => {
            format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
        }
        GeneratedValue::Array(values) => array_literal(values),
    }
}

fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Batched `INSERT` for `records`, or `None` when there is nothing to insert.
///
/// The column list comes from the first record; a record missing one of
/// those columns renders `NULL` in its place. Records without any columns
/// insert database defaults only.
pub fn build_insert(table: &str, records: &[GeneratedRecord]) -> Option<String> {
    let first = records.first()?;
    let table = quote_identifier(table);

    if first.is_empty() {
        return Some(format!(
            "INSERT INTO {table} SELECT FROM generate_series(1, {});",
            records.len()
        ));
    }

    let columns: Vec<&str> = first.columns().collect();
    let column_list = columns
        .iter()
        .map(|column| quote_identifier(column))
        .collect::<Vec<_>>()
        .join(", ");

    let rows = records
        .iter()
        .map(|record| {
            let values = columns
                .iter()
                .map(|column| {
                    record
                        .get(column)
                        .map_or_else(|| "NULL".to_string(), render_literal)
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("({values})")
        })
        .collect::<Vec<_>>()
        .join(", ");

    Some(format!("INSERT INTO {table} ({column_list}) VALUES {rows};"))
}
