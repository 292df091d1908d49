use serde::Serialize;

/// Closed set of column kinds the generator understands.
///
/// Parsed from a declared SQL type string. Anything unrecognised lands in
/// [`ColumnKind::Unknown`] and is generated as a short random string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Integer,
    BigInt,
    SmallInt,
    Decimal,
    Boolean,
    Uuid,
    Date,
    Time { zoned: bool },
    Timestamp { zoned: bool },
    Json,
    Text,
    Enum(Vec<String>),
    Array(Box<ColumnKind>),
    Unknown(String),
}

impl ColumnKind {
    /// Parse a declared type such as `character varying(255)` or `integer[]`.
    pub fn parse(declared: &str) -> Self {
        Self::parse_with_labels(declared, None)
    }

    /// Parse a declared type, treating it as an enum when labels are known.
    pub fn parse_with_labels(declared: &str, labels: Option<&[String]>) -> Self {
        let normalized = normalize_declared_type(declared);
        if let Some(base) = normalized.strip_suffix("[]") {
            return Self::Array(Box::new(Self::parse_with_labels(base, labels)));
        }
        if let Some(labels) = labels.filter(|labels| !labels.is_empty()) {
            return Self::Enum(labels.to_vec());
        }

        match normalized.as_str() {
            "integer" | "int" | "int4" | "serial" | "serial4" => Self::Integer,
            "bigint" | "int8" | "bigserial" | "serial8" => Self::BigInt,
            "smallint" | "int2" | "smallserial" | "serial2" => Self::SmallInt,
            "numeric" | "decimal" | "real" | "double precision" | "float4" | "float8" => {
                Self::Decimal
            }
            "boolean" | "bool" => Self::Boolean,
            "uuid" => Self::Uuid,
            "date" => Self::Date,
            "time" | "time without time zone" => Self::Time { zoned: false },
            "time with time zone" | "timetz" => Self::Time { zoned: true },
            "timestamp" | "timestamp without time zone" => Self::Timestamp { zoned: false },
            "timestamp with time zone" | "timestamptz" => Self::Timestamp { zoned: true },
            "json" | "jsonb" => Self::Json,
            "character varying" | "varchar" | "text" | "character" | "char" | "bpchar" => {
                Self::Text
            }
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Integer | Self::BigInt | Self::SmallInt)
    }
}

/// Character length declared in a type modifier, e.g. `12` in `varchar(12)`.
pub fn declared_length(declared: &str) -> Option<usize> {
    let start = declared.find('(')?;
    let rest = &declared[start + 1..];
    let end = rest.find([')', ','])?;
    rest[..end].trim().parse().ok().filter(|length| *length > 0)
}

/// Lower-case, drop `(...)` modifiers and collapse whitespace.
fn normalize_declared_type(declared: &str) -> String {
    let mut stripped = String::with_capacity(declared.len());
    let mut depth = 0_usize;
    for ch in declared.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => stripped.push(ch),
            _ => {}
        }
    }

    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
        .replace(" []", "[]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_postgres_types() {
        assert_eq!(ColumnKind::parse("INTEGER"), ColumnKind::Integer);
        assert_eq!(ColumnKind::parse("bigint"), ColumnKind::BigInt);
        assert_eq!(ColumnKind::parse("numeric(10,2)"), ColumnKind::Decimal);
        assert_eq!(ColumnKind::parse("character varying(255)"), ColumnKind::Text);
        assert_eq!(
            ColumnKind::parse("timestamp(6) with time zone"),
            ColumnKind::Timestamp { zoned: true }
        );
        assert_eq!(
            ColumnKind::parse("time without time zone"),
            ColumnKind::Time { zoned: false }
        );
        assert_eq!(ColumnKind::parse("JSONB"), ColumnKind::Json);
    }

    #[test]
    fn parses_array_types_recursively() {
        assert_eq!(
            ColumnKind::parse("integer[]"),
            ColumnKind::Array(Box::new(ColumnKind::Integer))
        );
        assert_eq!(
            ColumnKind::parse("character varying(20)[]"),
            ColumnKind::Array(Box::new(ColumnKind::Text))
        );
        assert_eq!(
            ColumnKind::parse("geometry[]"),
            ColumnKind::Array(Box::new(ColumnKind::Unknown("geometry".to_string())))
        );
    }

    #[test]
    fn unknown_types_are_kept_verbatim() {
        assert_eq!(
            ColumnKind::parse("tsvector"),
            ColumnKind::Unknown("tsvector".to_string())
        );
    }

    #[test]
    fn labels_turn_a_type_into_an_enum() {
        let labels = vec!["draft".to_string(), "published".to_string()];
        assert_eq!(
            ColumnKind::parse_with_labels("post_status", Some(&labels)),
            ColumnKind::Enum(labels.clone())
        );
        assert_eq!(
            ColumnKind::parse_with_labels("post_status", Some(&[])),
            ColumnKind::Unknown("post_status".to_string())
        );
    }

    #[test]
    fn reads_declared_length() {
        assert_eq!(declared_length("character varying(40)"), Some(40));
        assert_eq!(declared_length("numeric(10,2)"), Some(10));
        assert_eq!(declared_length("text"), None);
        assert_eq!(declared_length("varchar(0)"), None);
    }
}
