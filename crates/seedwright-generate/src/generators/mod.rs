use std::fmt;

use chrono::NaiveDateTime;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use tracing::warn;

use seedwright_core::{ColumnKind, ColumnMetadata};

use crate::config::ColumnOptions;

pub mod primitives;
pub mod semantic;

/// Generated value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Array(Vec<GeneratedValue>),
}

impl GeneratedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, GeneratedValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            GeneratedValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GeneratedValue::Int(value) => Some(*value as f64),
            GeneratedValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            GeneratedValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[GeneratedValue]> {
        match self {
            GeneratedValue::Array(values) => Some(values.as_slice()),
            _ => None,
        }
    }
}

impl Serialize for GeneratedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GeneratedValue::Null => serializer.serialize_unit(),
            GeneratedValue::Bool(value) => serializer.serialize_bool(*value),
            GeneratedValue::Int(value) => serializer.serialize_i64(*value),
            GeneratedValue::Float(value) => serializer.serialize_f64(*value),
            GeneratedValue::Text(value) => serializer.serialize_str(value),
            GeneratedValue::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

impl From<&str> for GeneratedValue {
    fn from(value: &str) -> Self {
        GeneratedValue::Text(value.to_string())
    }
}

impl From<i64> for GeneratedValue {
    fn from(value: i64) -> Self {
        GeneratedValue::Int(value)
    }
}

impl From<bool> for GeneratedValue {
    fn from(value: bool) -> Self {
        GeneratedValue::Bool(value)
    }
}

/// One generated row: column name to value, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedRecord {
    values: Vec<(String, GeneratedValue)>,
}

impl GeneratedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column`, replacing an existing value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: GeneratedValue) {
        let column = column.into();
        match self.values.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.values.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&GeneratedValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GeneratedValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, GeneratedValue)> for GeneratedRecord {
    fn from_iter<I: IntoIterator<Item = (K, GeneratedValue)>>(iter: I) -> Self {
        let mut record = GeneratedRecord::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

impl Serialize for GeneratedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in &self.values {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

static NO_OPTIONS: ColumnOptions = ColumnOptions {
    min: None,
    max: None,
    precision: None,
    max_length: None,
    pattern: None,
    start_date: None,
    end_date: None,
};

/// Inputs shared by the generators of a single column.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorContext<'a> {
    pub table: &'a str,
    pub column: &'a ColumnMetadata,
    pub options: &'a ColumnOptions,
    /// Upper bound for default date and timestamp ranges.
    pub reference_time: NaiveDateTime,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(
        table: &'a str,
        column: &'a ColumnMetadata,
        options: Option<&'a ColumnOptions>,
        reference_time: NaiveDateTime,
    ) -> Self {
        Self {
            table,
            column,
            options: options.unwrap_or(&NO_OPTIONS),
            reference_time,
        }
    }

    /// Configured `max_length`, else the declared character length.
    pub fn max_length(&self) -> Option<usize> {
        self.options.max_length.or(self.column.max_length)
    }

    /// Return `(low, high)` in order, logging when the configured bounds
    /// had to be swapped.
    pub(crate) fn ordered<T: PartialOrd + fmt::Display>(
        &self,
        what: &str,
        low: T,
        high: T,
    ) -> (T, T) {
        if low > high {
            warn!(
                table = %self.table,
                column = %self.column.name,
                low = %low,
                high = %high,
                "{what} bounds inverted; swapping"
            );
            (high, low)
        } else {
            (low, high)
        }
    }
}

/// Generate a non-null value for the column in `ctx`.
pub fn generate_value(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    generate_kind(&ctx.column.kind, ctx, rng)
}

fn generate_kind(
    kind: &ColumnKind,
    ctx: &GeneratorContext<'_>,
    rng: &mut dyn RngCore,
) -> GeneratedValue {
    match kind {
        ColumnKind::Integer | ColumnKind::BigInt | ColumnKind::SmallInt => {
            primitives::integer(kind, ctx, rng)
        }
        ColumnKind::Decimal => primitives::decimal(ctx, rng),
        ColumnKind::Boolean => GeneratedValue::Bool(rng.random_bool(0.5)),
        ColumnKind::Uuid => GeneratedValue::Text(primitives::uuid_v4(rng)),
        ColumnKind::Date => primitives::date(ctx, rng),
        ColumnKind::Time { zoned } => primitives::time(*zoned, rng),
        ColumnKind::Timestamp { zoned } => primitives::timestamp(*zoned, ctx, rng),
        ColumnKind::Json => GeneratedValue::Text(semantic::json_document(&ctx.column.name, rng)),
        ColumnKind::Text => GeneratedValue::Text(text(ctx, rng)),
        ColumnKind::Enum(labels) => pick_enum(labels, rng),
        ColumnKind::Array(base) => array(base, ctx, rng),
        ColumnKind::Unknown(_) => {
            GeneratedValue::Text(primitives::alphanumeric(primitives::UNKNOWN_TEXT_LEN, rng))
        }
    }
}

/// Pattern option, then name heuristics, then random text.
fn text(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> String {
    let max_length = ctx.max_length();
    let value = match ctx.options.pattern.as_deref() {
        Some(pattern) => primitives::pattern(pattern, rng),
        None => match semantic::text(&ctx.column.name, rng) {
            Some(value) => value,
            None => return primitives::random_text(max_length, rng),
        },
    };
    match max_length {
        Some(limit) => primitives::truncate_chars(value, limit),
        None => value,
    }
}

fn pick_enum(labels: &[String], rng: &mut dyn RngCore) -> GeneratedValue {
    labels
        .choose(rng)
        .map(|label| GeneratedValue::Text(label.clone()))
        .unwrap_or(GeneratedValue::Null)
}

/// One-dimensional array of 1-5 elements. Nested array kinds are flattened
/// to their innermost element kind.
fn array(base: &ColumnKind, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    let mut element = base;
    while let ColumnKind::Array(inner) = element {
        element = inner;
    }

    let len = rng.random_range(primitives::ARRAY_LEN_MIN..=primitives::ARRAY_LEN_MAX);
    let values = (0..len)
        .map(|_| match element {
            ColumnKind::Unknown(_) => GeneratedValue::Text(primitives::array_token(rng)),
            known => generate_kind(known, ctx, rng),
        })
        .collect();
    GeneratedValue::Array(values)
}
