use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::GenerationError;

/// Records generated for a table when nothing else is configured.
pub const DEFAULT_RECORD_COUNT: usize = 10;

/// Per-run generation configuration, keyed by table name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GenerationConfig {
    /// Record count for tables without an explicit `count`.
    #[serde(alias = "defaultCount", skip_serializing_if = "Option::is_none")]
    pub default_count: Option<usize>,
    pub tables: BTreeMap<String, TableConfig>,
}

/// Configuration for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TableConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub columns: BTreeMap<String, ColumnOptions>,
}

/// Generator overrides for one column. Unset fields use generator defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColumnOptions {
    /// Lower bound for numeric columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound for numeric columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Decimal digits kept for decimal columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(alias = "maxLength", skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Text template: `X` is a digit, `A` an uppercase letter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(alias = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(alias = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl GenerationConfig {
    /// Parse a TOML or JSON config, picking the format from the extension.
    pub fn load(path: &Path) -> Result<Self, GenerationError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") | None => Self::from_toml_str(&content),
            Some(other) => Err(GenerationError::Config(format!(
                "unsupported config extension '.{other}' (expected .toml or .json)"
            ))),
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, GenerationError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self, GenerationError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn table(&self, name: &str) -> Option<&TableConfig> {
        self.tables.get(name)
    }

    /// Records to generate for `table`.
    pub fn count_for(&self, table: &str) -> usize {
        self.tables
            .get(table)
            .and_then(|config| config.count)
            .or(self.default_count)
            .unwrap_or(DEFAULT_RECORD_COUNT)
    }

    pub fn with_count(mut self, table: impl Into<String>, count: usize) -> Self {
        self.tables.entry(table.into()).or_default().count = Some(count);
        self
    }

    pub fn with_column(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        options: ColumnOptions,
    ) -> Self {
        self.tables
            .entry(table.into())
            .or_default()
            .columns
            .insert(column.into(), options);
        self
    }
}

impl TableConfig {
    pub fn column(&self, name: &str) -> Option<&ColumnOptions> {
        self.columns.get(name)
    }
}
