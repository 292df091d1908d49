use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{ColumnKind, declared_length};

/// Default-expression fragments that mark a database-assigned key.
const AUTO_INCREMENT_MARKERS: &[&str] = &["nextval(", "auto_increment", "autoincrement"];

/// A table as returned by schema introspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn new(name: impl Into<String>, columns: Vec<RawColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }
}

/// A column as returned by schema introspection.
///
/// `constraint` is kept as the raw tag (`PRIMARY KEY`, `FOREIGN KEY`, ...)
/// so that unexpected tags degrade to "no constraint" instead of failing
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RawColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub constraint: Option<String>,
    #[serde(default)]
    pub foreign_table: Option<String>,
    #[serde(default)]
    pub foreign_column: Option<String>,
    /// Labels of the column's enum type, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityGeneration>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: false,
            default: None,
            constraint: None,
            foreign_table: None,
            foreign_column: None,
            enum_values: None,
            identity: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.constraint = Some(ColumnConstraint::PrimaryKey.as_str().to_string());
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.constraint = Some(ColumnConstraint::ForeignKey.as_str().to_string());
        self.foreign_table = Some(table.into());
        self.foreign_column = Some(column.into());
        self
    }

    pub fn with_enum_values(mut self, labels: Vec<String>) -> Self {
        self.enum_values = Some(labels);
        self
    }
}

/// Identity generation strategy for columns using `GENERATED ... AS IDENTITY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IdentityGeneration {
    Always,
    ByDefault,
}

/// Key constraint attached to a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnConstraint {
    #[serde(rename = "PRIMARY KEY")]
    PrimaryKey,
    #[serde(rename = "FOREIGN KEY")]
    ForeignKey,
}

impl ColumnConstraint {
    /// Parse a constraint tag, ignoring case and `_`/space differences.
    pub fn parse(tag: &str) -> Option<Self> {
        let normalized: String = tag
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|part| !part.is_empty())
            .map(|part| part.to_ascii_uppercase())
            .collect::<Vec<_>>()
            .join(" ");
        match normalized.as_str() {
            "PRIMARY KEY" => Some(Self::PrimaryKey),
            "FOREIGN KEY" => Some(Self::ForeignKey),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryKey => "PRIMARY KEY",
            Self::ForeignKey => "FOREIGN KEY",
        }
    }
}

/// Analyzed column metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMetadata {
    pub name: String,
    pub data_type: String,
    pub kind: ColumnKind,
    pub nullable: bool,
    pub default: Option<String>,
    pub constraint: Option<ColumnConstraint>,
    pub foreign_table: Option<String>,
    pub foreign_column: Option<String>,
    pub identity: Option<IdentityGeneration>,
    /// Declared character length, e.g. `12` for `character varying(12)`.
    pub max_length: Option<usize>,
}

impl ColumnMetadata {
    pub fn from_raw(raw: &RawColumn) -> Self {
        let kind = ColumnKind::parse_with_labels(&raw.data_type, raw.enum_values.as_deref());
        let max_length = if kind.is_text() {
            declared_length(&raw.data_type)
        } else {
            None
        };

        Self {
            name: raw.name.clone(),
            data_type: raw.data_type.clone(),
            kind,
            nullable: raw.nullable,
            default: raw.default.clone(),
            constraint: raw.constraint.as_deref().and_then(ColumnConstraint::parse),
            foreign_table: non_empty(raw.foreign_table.as_deref()),
            foreign_column: non_empty(raw.foreign_column.as_deref()),
            identity: raw.identity,
            max_length,
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraint == Some(ColumnConstraint::PrimaryKey)
    }

    pub fn is_foreign_key(&self) -> bool {
        self.constraint == Some(ColumnConstraint::ForeignKey)
    }

    /// True when the database assigns this primary key on insert.
    pub fn is_auto_increment(&self) -> bool {
        if !self.is_primary_key() {
            return false;
        }
        if self.identity.is_some() {
            return true;
        }
        self.default.as_deref().is_some_and(|default| {
            let default = default.to_ascii_lowercase();
            AUTO_INCREMENT_MARKERS
                .iter()
                .any(|marker| default.contains(marker))
        })
    }
}

/// Parse a JSON schema snapshot (`[{"name": ..., "columns": [...]}]`).
pub fn parse_snapshot(json: &str) -> Result<Vec<RawTable>> {
    serde_json::from_str(json).map_err(|err| Error::InvalidSchema(err.to_string()))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_tags_parse_loosely() {
        assert_eq!(
            ColumnConstraint::parse("PRIMARY KEY"),
            Some(ColumnConstraint::PrimaryKey)
        );
        assert_eq!(
            ColumnConstraint::parse("foreign_key"),
            Some(ColumnConstraint::ForeignKey)
        );
        assert_eq!(ColumnConstraint::parse("UNIQUE"), None);
        assert_eq!(ColumnConstraint::parse(""), None);
    }

    #[test]
    fn serial_primary_key_is_auto_increment() {
        let column = ColumnMetadata::from_raw(
            &RawColumn::new("id", "integer")
                .primary_key()
                .with_default("nextval('users_id_seq'::regclass)"),
        );
        assert!(column.is_auto_increment());
    }

    #[test]
    fn sequence_default_on_plain_column_is_not_auto_increment() {
        let column = ColumnMetadata::from_raw(
            &RawColumn::new("ticket_no", "integer").with_default("nextval('tickets_seq')"),
        );
        assert!(!column.is_auto_increment());
    }

    #[test]
    fn identity_primary_key_is_auto_increment() {
        let mut raw = RawColumn::new("id", "bigint").primary_key();
        raw.identity = Some(IdentityGeneration::Always);
        assert!(ColumnMetadata::from_raw(&raw).is_auto_increment());
    }

    #[test]
    fn uuid_primary_key_with_function_default_is_generated() {
        let column = ColumnMetadata::from_raw(
            &RawColumn::new("id", "uuid")
                .primary_key()
                .with_default("gen_random_uuid()"),
        );
        assert!(!column.is_auto_increment());
    }

    #[test]
    fn declared_length_applies_to_text_only() {
        let text = ColumnMetadata::from_raw(&RawColumn::new("code", "character varying(12)"));
        assert_eq!(text.max_length, Some(12));
        let numeric = ColumnMetadata::from_raw(&RawColumn::new("total", "numeric(10,2)"));
        assert_eq!(numeric.max_length, None);
    }

    #[test]
    fn blank_foreign_table_is_treated_as_missing() {
        let mut raw = RawColumn::new("owner_id", "integer");
        raw.constraint = Some("FOREIGN KEY".to_string());
        raw.foreign_table = Some("  ".to_string());
        let column = ColumnMetadata::from_raw(&raw);
        assert!(column.is_foreign_key());
        assert_eq!(column.foreign_table, None);
    }

    #[test]
    fn snapshot_uses_type_key() {
        let tables = parse_snapshot(
            r#"[{"name": "users", "columns": [
                {"name": "id", "type": "integer", "nullable": false,
                 "default": null, "constraint": "PRIMARY KEY",
                 "foreign_table": null, "foreign_column": null}
            ]}]"#,
        )
        .expect("parse snapshot");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns[0].data_type, "integer");
        assert_eq!(tables[0].columns[0].constraint.as_deref(), Some("PRIMARY KEY"));
    }

    #[test]
    fn malformed_snapshot_is_invalid_schema() {
        let err = parse_snapshot("{not json").expect_err("should fail");
        assert!(matches!(err, Error::InvalidSchema(_)));
    }
}
