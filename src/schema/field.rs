//! Field-level types of the schema model.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// Normalized type tag of a field.
///
/// Rendered in the upper-case form downstream generators expect, with
/// parameters kept inline: `ENUM('LEFT','RIGHT')`, `ARRAY(INTEGER)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Text,
    Char,
    Integer,
    BigInt,
    SmallInt,
    Float,
    Double,
    Decimal,
    Boolean,
    /// Date with time component.
    Date,
    /// Calendar date without time.
    DateOnly,
    Time,
    Uuid,
    Json,
    Jsonb,
    Blob,
    ObjectId,
    Array(Box<FieldType>),
    Enum(Vec<String>),
}

impl FieldType {
    /// Shorthand for `ARRAY(inner)`.
    pub fn array_of(inner: FieldType) -> Self {
        Self::Array(Box::new(inner))
    }

    /// Whether values of this type are textual.
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String | Self::Text | Self::Char | Self::Enum(_))
    }

    /// Whether values of this type are numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::BigInt
                | Self::SmallInt
                | Self::Float
                | Self::Double
                | Self::Decimal
        )
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json | Self::Jsonb)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Whether this type holds a single identifier-like value.
    pub fn is_identifier(&self) -> bool {
        matches!(self, Self::ObjectId | Self::Uuid)
    }

    /// Whether this type is an identifier or an array of identifiers.
    ///
    /// Only such fields are candidates for document reference inference.
    pub fn holds_identifiers(&self) -> bool {
        match self {
            Self::Array(inner) => inner.is_identifier(),
            other => other.is_identifier(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "STRING"),
            Self::Text => write!(f, "TEXT"),
            Self::Char => write!(f, "CHAR"),
            Self::Integer => write!(f, "INTEGER"),
            Self::BigInt => write!(f, "BIGINT"),
            Self::SmallInt => write!(f, "SMALLINT"),
            Self::Float => write!(f, "FLOAT"),
            Self::Double => write!(f, "DOUBLE"),
            Self::Decimal => write!(f, "DECIMAL"),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Date => write!(f, "DATE"),
            Self::DateOnly => write!(f, "DATEONLY"),
            Self::Time => write!(f, "TIME"),
            Self::Uuid => write!(f, "UUID"),
            Self::Json => write!(f, "JSON"),
            Self::Jsonb => write!(f, "JSONB"),
            Self::Blob => write!(f, "BLOB"),
            Self::ObjectId => write!(f, "OBJECT_ID"),
            Self::Array(inner) => write!(f, "ARRAY({inner})"),
            Self::Enum(values) => {
                write!(f, "ENUM(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "'{}'", value.replace('\'', "''"))?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Default value of a field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    /// A literal parsed into its native value.
    Literal(Value),
    /// A database-side expression, kept as raw text and never evaluated.
    Expression(String),
}

impl DefaultValue {
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    pub fn expression(text: impl Into<String>) -> Self {
        Self::Expression(text.into())
    }

    pub fn is_expression(&self) -> bool {
        matches!(self, Self::Expression(_))
    }

    /// The literal value, if this default is one.
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Expression(_) => None,
        }
    }
}

/// One column of a table or property of a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Convention-normalized identifier for display and code generation.
    pub name: String,
    /// Raw identifier in storage; the one used for I/O.
    pub column_name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub is_primary_key: bool,
    pub is_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
}

impl Field {
    /// A field whose logical name equals its column name.
    pub fn new(column_name: impl Into<String>, field_type: FieldType) -> Self {
        let column_name = column_name.into();
        Self {
            name: column_name.clone(),
            column_name,
            field_type,
            is_primary_key: false,
            is_required: false,
            default_value: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }
}
