use std::collections::{BTreeMap, HashMap};

use seedwright_core::{ColumnConstraint, IdentityGeneration, RawColumn, RawTable};

use crate::options::IntrospectOptions;

use super::queries::{CatalogColumn, KeyColumn, qualified_type_name};

#[derive(Default)]
struct KeyInfo {
    primary: bool,
    foreign: Option<(Option<String>, Option<String>)>,
}

/// Group catalog columns into tables, attaching key and enum information.
///
/// A column that is both part of the primary key and a foreign key is
/// reported as a foreign key so that generated values stay referentially
/// valid.
pub fn map_tables(
    columns: Vec<CatalogColumn>,
    keys: &[KeyColumn],
    enums: &BTreeMap<String, Vec<String>>,
    opts: &IntrospectOptions,
) -> Vec<RawTable> {
    let mut key_info: HashMap<(&str, &str), KeyInfo> = HashMap::new();
    for key in keys {
        let info = key_info
            .entry((key.table_name.as_str(), key.column_name.as_str()))
            .or_default();
        match key.contype.as_str() {
            "p" => info.primary = true,
            "f" if info.foreign.is_none() => {
                info.foreign = Some((key.foreign_table.clone(), key.foreign_column.clone()));
            }
            _ => {}
        }
    }

    let mut tables: Vec<RawTable> = Vec::new();
    for column in columns {
        if !opts.includes(&column.table_name) {
            continue;
        }

        let info = key_info.get(&(column.table_name.as_str(), column.column_name.as_str()));
        let raw = map_column(&column, info, enums);

        match tables.last_mut() {
            Some(table) if table.name == column.table_name => table.columns.push(raw),
            _ => tables.push(RawTable::new(column.table_name.clone(), vec![raw])),
        }
    }

    tables
}

fn map_column(
    column: &CatalogColumn,
    info: Option<&KeyInfo>,
    enums: &BTreeMap<String, Vec<String>>,
) -> RawColumn {
    let mut raw = RawColumn::new(column.column_name.clone(), declared_type(column));
    raw.nullable = column.is_nullable;
    raw.default = column.default.clone();
    raw.identity = column
        .identity_generation
        .as_deref()
        .and_then(identity_from_text);

    let enum_name = match column.data_type.as_str() {
        "USER-DEFINED" => Some(column.udt_name.as_str()),
        "ARRAY" => Some(column.udt_name.trim_start_matches('_')),
        _ => None,
    };
    raw.enum_values = enum_name
        .and_then(|name| enums.get(&qualified_type_name(&column.udt_schema, name)))
        .cloned();

    if let Some(info) = info {
        if let Some((table, foreign_column)) = &info.foreign {
            raw.constraint = Some(ColumnConstraint::ForeignKey.as_str().to_string());
            raw.foreign_table = table.clone();
            raw.foreign_column = foreign_column.clone();
        } else if info.primary {
            raw.constraint = Some(ColumnConstraint::PrimaryKey.as_str().to_string());
        }
    }

    raw
}

/// Canonical declared type, e.g. `character varying(40)` or `integer[]`.
fn declared_type(column: &CatalogColumn) -> String {
    match column.data_type.as_str() {
        "ARRAY" => format!(
            "{}[]",
            canonical_udt(column.udt_name.trim_start_matches('_'))
        ),
        "USER-DEFINED" => column.udt_name.clone(),
        "character varying" | "character" => match column.character_max_length {
            Some(length) => format!("{}({length})", column.data_type),
            None => column.data_type.clone(),
        },
        "numeric" => match (column.numeric_precision, column.numeric_scale) {
            (Some(precision), Some(scale)) => format!("numeric({precision},{scale})"),
            _ => column.data_type.clone(),
        },
        other => other.to_string(),
    }
}

fn canonical_udt(udt: &str) -> &str {
    match udt {
        "int2" => "smallint",
        "int4" => "integer",
        "int8" => "bigint",
        "float4" => "real",
        "float8" => "double precision",
        "bool" => "boolean",
        "varchar" => "character varying",
        "bpchar" => "character",
        "timestamptz" => "timestamp with time zone",
        "timestamp" => "timestamp without time zone",
        "timetz" => "time with time zone",
        "time" => "time without time zone",
        other => other,
    }
}

fn identity_from_text(value: &str) -> Option<IdentityGeneration> {
    match value.to_ascii_uppercase().as_str() {
        "ALWAYS" => Some(IdentityGeneration::Always),
        "BY DEFAULT" => Some(IdentityGeneration::ByDefault),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(table: &str, name: &str, data_type: &str, udt: &str) -> CatalogColumn {
        CatalogColumn {
            table_name: table.to_string(),
            column_name: name.to_string(),
            data_type: data_type.to_string(),
            udt_name: udt.to_string(),
            udt_schema: "public".to_string(),
            character_max_length: None,
            numeric_precision: None,
            numeric_scale: None,
            is_nullable: false,
            default: None,
            identity_generation: None,
        }
    }

    fn key(table: &str, column: &str, contype: &str, target: Option<&str>) -> KeyColumn {
        KeyColumn {
            table_name: table.to_string(),
            column_name: column.to_string(),
            contype: contype.to_string(),
            foreign_table: target.map(str::to_string),
            foreign_column: target.map(|_| "id".to_string()),
        }
    }

    #[test]
    fn canonicalizes_array_and_length_types() {
        let tags = catalog("posts", "tags", "ARRAY", "_varchar");
        assert_eq!(declared_type(&tags), "character varying[]");

        let mut title = catalog("posts", "title", "character varying", "varchar");
        title.character_max_length = Some(120);
        assert_eq!(declared_type(&title), "character varying(120)");

        let mut price = catalog("items", "price", "numeric", "numeric");
        price.numeric_precision = Some(10);
        price.numeric_scale = Some(2);
        assert_eq!(declared_type(&price), "numeric(10,2)");
    }

    #[test]
    fn groups_columns_and_attaches_keys() {
        let mut id = catalog("posts", "id", "integer", "int4");
        id.default = Some("nextval('posts_id_seq'::regclass)".to_string());
        let columns = vec![
            id,
            catalog("posts", "author_id", "integer", "int4"),
            catalog("users", "id", "integer", "int4"),
        ];
        let keys = vec![
            key("posts", "id", "p", None),
            key("posts", "author_id", "f", Some("users")),
            key("users", "id", "p", None),
        ];

        let tables = map_tables(columns, &keys, &BTreeMap::new(), &IntrospectOptions::default());
        assert_eq!(tables.len(), 2);
        let posts = &tables[0];
        assert_eq!(posts.columns[0].constraint.as_deref(), Some("PRIMARY KEY"));
        assert_eq!(posts.columns[1].constraint.as_deref(), Some("FOREIGN KEY"));
        assert_eq!(posts.columns[1].foreign_table.as_deref(), Some("users"));
        assert_eq!(posts.columns[1].foreign_column.as_deref(), Some("id"));
    }

    #[test]
    fn foreign_key_wins_over_primary_key() {
        let columns = vec![catalog("profiles", "user_id", "integer", "int4")];
        let keys = vec![
            key("profiles", "user_id", "p", None),
            key("profiles", "user_id", "f", Some("users")),
        ];
        let tables = map_tables(columns, &keys, &BTreeMap::new(), &IntrospectOptions::default());
        assert_eq!(
            tables[0].columns[0].constraint.as_deref(),
            Some("FOREIGN KEY")
        );
    }

    #[test]
    fn attaches_enum_labels_and_identity() {
        let status = catalog("orders", "status", "USER-DEFINED", "order_status");
        let mut id = catalog("orders", "id", "bigint", "int8");
        id.identity_generation = Some("ALWAYS".to_string());

        let mut enums = BTreeMap::new();
        enums.insert(
            "public.order_status".to_string(),
            vec!["pending".to_string(), "shipped".to_string()],
        );
        enums.insert(
            "billing.order_status".to_string(),
            vec!["invoiced".to_string()],
        );

        let tables = map_tables(
            vec![id, status],
            &[],
            &enums,
            &IntrospectOptions::default(),
        );
        let columns = &tables[0].columns;
        assert_eq!(columns[0].identity, Some(IdentityGeneration::Always));
        assert_eq!(columns[1].data_type, "order_status");
        assert_eq!(
            columns[1].enum_values.as_deref(),
            Some(&["pending".to_string(), "shipped".to_string()][..])
        );
    }

    #[test]
    fn enum_labels_follow_the_column_type_schema() {
        let mut status = catalog("invoices", "status", "USER-DEFINED", "order_status");
        status.udt_schema = "billing".to_string();
        let mut history = catalog("invoices", "history", "ARRAY", "_order_status");
        history.udt_schema = "billing".to_string();

        let mut enums = BTreeMap::new();
        enums.insert(
            "public.order_status".to_string(),
            vec!["pending".to_string(), "shipped".to_string()],
        );
        enums.insert(
            "billing.order_status".to_string(),
            vec!["invoiced".to_string(), "paid".to_string()],
        );

        let tables = map_tables(
            vec![status, history],
            &[],
            &enums,
            &IntrospectOptions::default(),
        );
        let expected = ["invoiced".to_string(), "paid".to_string()];
        for column in &tables[0].columns {
            assert_eq!(column.enum_values.as_deref(), Some(&expected[..]));
        }
    }

    #[test]
    fn excluded_tables_are_skipped() {
        let columns = vec![
            catalog("_sqlx_migrations", "version", "bigint", "int8"),
            catalog("users", "id", "integer", "int4"),
        ];
        let opts = IntrospectOptions {
            exclude_tables: vec!["_sqlx_migrations".to_string()],
            ..IntrospectOptions::default()
        };
        let tables = map_tables(columns, &[], &BTreeMap::new(), &opts);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "users");
    }
}
