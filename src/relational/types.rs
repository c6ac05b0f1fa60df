//! Type normalization.
//!
//! Maps engine type text onto [`FieldType`]. Parameters that carry meaning
//! (enum values, array element types) are kept; length and precision are
//! dropped.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::{ColumnRow, Dialect};
use crate::schema::FieldType;

/// Strips `(255)`, `(10,2)` and similar modifiers.
static TYPE_MODIFIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// `enum('a','b')` as reported by MySQL.
static MYSQL_ENUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*enum\s*\((.*)\)\s*$").unwrap());

/// One quoted value inside an enum or set definition.
static QUOTED_VALUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"'((?:[^']|'')*)'").unwrap());

/// Fallback tag for types without a mapping.
pub const FALLBACK_TYPE: FieldType = FieldType::String;

/// Result of normalizing one column type.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedType {
    Mapped(FieldType),
    /// No mapping; the field uses [`FALLBACK_TYPE`].
    Unsupported(String),
}

impl NormalizedType {
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Mapped(ty) => ty.clone(),
            Self::Unsupported(_) => FALLBACK_TYPE,
        }
    }
}

/// Normalize the type of a catalog column.
pub fn normalize_column_type(row: &ColumnRow) -> NormalizedType {
    if let Some(values) = &row.enum_values {
        return NormalizedType::Mapped(FieldType::Enum(values.clone()));
    }

    if row.raw_type.eq_ignore_ascii_case("ARRAY") {
        let element = row.element_type.as_deref().unwrap_or_default();
        return match normalize_type_name(row.dialect, element) {
            Some(inner) => NormalizedType::Mapped(FieldType::array_of(inner)),
            None => NormalizedType::Unsupported(format!("{}[]", element)),
        };
    }

    match normalize_type_name(row.dialect, &row.raw_type) {
        Some(ty) => NormalizedType::Mapped(ty),
        None => NormalizedType::Unsupported(row.raw_type.clone()),
    }
}

/// Normalize a type name in the given dialect.
pub fn normalize_type_name(dialect: Dialect, raw: &str) -> Option<FieldType> {
    let trimmed = raw.trim();

    if let Some(element) = trimmed.strip_suffix("[]") {
        return normalize_type_name(dialect, element).map(FieldType::array_of);
    }

    if let Some(caps) = MYSQL_ENUM.captures(trimmed) {
        let values = QUOTED_VALUE
            .captures_iter(&caps[1])
            .map(|c| c[1].replace("''", "'"))
            .collect();
        return Some(FieldType::Enum(values));
    }

    let lower = trimmed.to_lowercase();

    // Display widths that change meaning
    if matches!(dialect, Dialect::MySql | Dialect::MariaDb) && lower.starts_with("tinyint(1)") {
        return Some(FieldType::Boolean);
    }
    if lower == "bit(1)" {
        return Some(FieldType::Boolean);
    }

    let base = base_type_name(&lower);
    lookup(&base).or_else(|| match dialect {
        Dialect::Sqlite => sqlite_affinity(&base),
        _ => None,
    })
}

/// Lower-case type name with modifiers and sign qualifiers removed.
fn base_type_name(lower: &str) -> String {
    let stripped = TYPE_MODIFIER.replace_all(lower, "");
    stripped
        .split_whitespace()
        .filter(|word| !matches!(*word, "unsigned" | "signed" | "zerofill"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn lookup(base: &str) -> Option<FieldType> {
    let ty = match base {
        "varchar" | "character varying" | "nvarchar" | "varchar2" | "nvarchar2" | "citext"
        | "string" | "sysname" => FieldType::String,
        "char" | "character" | "nchar" | "bpchar" => FieldType::Char,
        "text" | "tinytext" | "mediumtext" | "longtext" | "ntext" | "clob" => FieldType::Text,
        "int" | "integer" | "int4" | "mediumint" | "serial" | "serial4" | "year" => {
            FieldType::Integer
        }
        "bigint" | "int8" | "bigserial" | "serial8" => FieldType::BigInt,
        "smallint" | "int2" | "tinyint" | "smallserial" | "serial2" => FieldType::SmallInt,
        "float" | "real" | "float4" => FieldType::Float,
        "double" | "double precision" | "float8" => FieldType::Double,
        "decimal" | "numeric" | "money" | "smallmoney" | "number" => FieldType::Decimal,
        "boolean" | "bool" | "bit" => FieldType::Boolean,
        "timestamp" | "timestamptz" | "timestamp with time zone"
        | "timestamp without time zone" | "datetime" | "datetime2" | "smalldatetime"
        | "datetimeoffset" => FieldType::Date,
        "date" => FieldType::DateOnly,
        "time" | "timetz" | "time with time zone" | "time without time zone" => FieldType::Time,
        "uuid" | "uniqueidentifier" => FieldType::Uuid,
        "json" => FieldType::Json,
        "jsonb" => FieldType::Jsonb,
        "blob" | "tinyblob" | "mediumblob" | "longblob" | "bytea" | "binary" | "varbinary"
        | "image" => FieldType::Blob,
        _ => return None,
    };
    Some(ty)
}

/// SQLite's type affinity rules for declared types without an exact match.
fn sqlite_affinity(base: &str) -> Option<FieldType> {
    if base.contains("int") {
        Some(FieldType::Integer)
    } else if base.contains("char") || base.contains("clob") || base.contains("text") {
        Some(FieldType::Text)
    } else if base.contains("blob") {
        Some(FieldType::Blob)
    } else if base.contains("real") || base.contains("floa") || base.contains("doub") {
        Some(FieldType::Double)
    } else {
        None
    }
}
