//! Raw catalog rows as reported by each engine, and their normalized shape.
//!
//! The worker returns column rows in the engine's own vocabulary, tagged by
//! dialect. They are converted into [`ColumnRow`] as soon as they are read so
//! that nothing past the normalizer sees dialect-specific shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// SQL dialect a catalog row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    MySql,
    /// Shares MySQL's catalog columns but reports defaults as SQL.
    MariaDb,
    Sqlite,
    MsSql,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => write!(f, "postgres"),
            Dialect::MySql => write!(f, "mysql"),
            Dialect::MariaDb => write!(f, "mariadb"),
            Dialect::Sqlite => write!(f, "sqlite"),
            Dialect::MsSql => write!(f, "mssql"),
        }
    }
}

/// One column row in the engine's own catalog vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dialect", rename_all = "lowercase")]
pub enum RawColumn {
    /// `information_schema.columns` joined with `pg_enum` and key usage.
    Postgres {
        column_name: String,
        data_type: String,
        #[serde(default)]
        udt_name: Option<String>,
        /// "YES" or "NO".
        is_nullable: String,
        #[serde(default)]
        column_default: Option<String>,
        #[serde(default)]
        is_primary_key: bool,
        #[serde(default)]
        is_identity: bool,
        #[serde(default)]
        enum_values: Option<Vec<String>>,
        #[serde(default)]
        element_type: Option<String>,
        #[serde(default)]
        ordinal_position: i32,
    },
    #[serde(rename = "mysql")]
    MySql(MySqlColumn),
    #[serde(rename = "mariadb")]
    MariaDb(MySqlColumn),
    /// `PRAGMA table_info`.
    Sqlite {
        cid: i32,
        name: String,
        #[serde(rename = "type")]
        declared_type: String,
        notnull: i32,
        dflt_value: Option<String>,
        /// 1-based position in the primary key, 0 if not part of it.
        pk: i32,
    },
    /// `sys.columns` joined with `sys.types` and `sys.default_constraints`.
    #[serde(rename = "mssql")]
    MsSql {
        name: String,
        type_name: String,
        is_nullable: bool,
        /// Wrapped in parentheses, e.g. `((0))` or `(getdate())`.
        #[serde(default)]
        default_definition: Option<String>,
        #[serde(default)]
        is_primary_key: bool,
        #[serde(default)]
        is_identity: bool,
        #[serde(default)]
        column_id: i32,
    },
}

/// `information_schema.columns` on MySQL or MariaDB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MySqlColumn {
    pub column_name: String,
    pub data_type: String,
    /// Full type text, e.g. `enum('a','b')` or `int(10) unsigned`.
    pub column_type: String,
    pub is_nullable: String,
    /// Unquoted text on MySQL; SQL syntax on MariaDB 10.2.7+, where a
    /// nullable column without default reports `NULL`.
    #[serde(default)]
    pub column_default: Option<String>,
    /// "PRI", "UNI", "MUL" or empty.
    #[serde(default)]
    pub column_key: String,
    /// e.g. `auto_increment`, `DEFAULT_GENERATED`.
    #[serde(default)]
    pub extra: String,
    #[serde(default)]
    pub ordinal_position: i32,
}

impl MySqlColumn {
    fn into_row(self, dialect: Dialect) -> ColumnRow {
        let extra = self.extra;
        let default = self.column_default.map(|text| {
            if extra.contains("DEFAULT_GENERATED") {
                RawDefault::Expression(text)
            } else if dialect == Dialect::MariaDb {
                RawDefault::Sql(text)
            } else {
                RawDefault::Text(text)
            }
        });

        ColumnRow {
            dialect,
            name: self.column_name,
            raw_type: self.column_type,
            enum_values: None,
            element_type: None,
            nullable: self.is_nullable.eq_ignore_ascii_case("YES"),
            default,
            primary_key: self.column_key.eq_ignore_ascii_case("PRI"),
            auto_increment: extra.to_lowercase().contains("auto_increment"),
            position: self.ordinal_position,
        }
    }
}

/// Raw default text, classified by how the engine reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDefault {
    /// SQL default clause: literals are quoted, expressions are bare.
    Sql(String),
    /// Unquoted literal text.
    Text(String),
    /// Flagged by the catalog as an expression.
    Expression(String),
}

impl RawDefault {
    pub fn text(&self) -> &str {
        match self {
            Self::Sql(s) | Self::Text(s) | Self::Expression(s) => s,
        }
    }
}

/// A column row with dialect differences resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRow {
    pub dialect: Dialect,
    pub name: String,
    /// Engine type text; `ARRAY` for Postgres arrays.
    pub raw_type: String,
    /// Values of a Postgres enum type.
    pub enum_values: Option<Vec<String>>,
    /// Element type of a Postgres array.
    pub element_type: Option<String>,
    pub nullable: bool,
    pub default: Option<RawDefault>,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub position: i32,
}

impl From<RawColumn> for ColumnRow {
    fn from(raw: RawColumn) -> Self {
        match raw {
            RawColumn::Postgres {
                column_name,
                data_type,
                udt_name,
                is_nullable,
                column_default,
                is_primary_key,
                is_identity,
                enum_values,
                element_type,
                ordinal_position,
            } => {
                let is_array = data_type.eq_ignore_ascii_case("ARRAY");
                let element_type = element_type.or_else(|| {
                    udt_name
                        .as_deref()
                        .filter(|_| is_array)
                        .map(|udt| udt.trim_start_matches('_').to_string())
                });
                // User-defined types other than enums are reported by udt name
                let raw_type = match (&enum_values, udt_name) {
                    (None, Some(udt)) if data_type.eq_ignore_ascii_case("USER-DEFINED") => udt,
                    _ => data_type,
                };
                let auto_increment = is_identity
                    || column_default
                        .as_deref()
                        .is_some_and(|d| d.starts_with("nextval("));

                ColumnRow {
                    dialect: Dialect::Postgres,
                    name: column_name,
                    raw_type,
                    enum_values,
                    element_type,
                    nullable: is_nullable.eq_ignore_ascii_case("YES"),
                    default: column_default.map(RawDefault::Sql),
                    primary_key: is_primary_key,
                    auto_increment,
                    position: ordinal_position,
                }
            }
            RawColumn::MySql(column) => column.into_row(Dialect::MySql),
            RawColumn::MariaDb(column) => column.into_row(Dialect::MariaDb),
            RawColumn::Sqlite {
                cid,
                name,
                declared_type,
                notnull,
                dflt_value,
                pk,
            } => {
                let primary_key = pk > 0;
                // INTEGER PRIMARY KEY aliases the rowid
                let auto_increment =
                    primary_key && declared_type.eq_ignore_ascii_case("INTEGER");

                ColumnRow {
                    dialect: Dialect::Sqlite,
                    name,
                    raw_type: declared_type,
                    enum_values: None,
                    element_type: None,
                    nullable: notnull == 0 && !primary_key,
                    default: dflt_value.map(RawDefault::Sql),
                    primary_key,
                    auto_increment,
                    position: cid + 1,
                }
            }
            RawColumn::MsSql {
                name,
                type_name,
                is_nullable,
                default_definition,
                is_primary_key,
                is_identity,
                column_id,
            } => ColumnRow {
                dialect: Dialect::MsSql,
                name,
                raw_type: type_name,
                enum_values: None,
                element_type: None,
                nullable: is_nullable,
                default: default_definition.map(RawDefault::Sql),
                primary_key: is_primary_key,
                auto_increment: is_identity,
                position: column_id,
            },
        }
    }
}

/// A foreign-key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawForeignKey {
    #[serde(default)]
    pub name: String,
    /// Columns in the owning table (ordered).
    pub columns: Vec<String>,
    pub referenced_table: String,
    /// Columns in the referenced table (ordered).
    #[serde(default)]
    pub referenced_columns: Vec<String>,
}

/// An index or unique constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawIndex {
    #[serde(default)]
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary: bool,
}

/// Everything the catalog reports about one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub name: String,
    pub columns: Vec<RawColumn>,
    #[serde(default)]
    pub foreign_keys: Vec<RawForeignKey>,
    #[serde(default)]
    pub indexes: Vec<RawIndex>,
}

impl RawTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, column: RawColumn) -> Self {
        self.columns.push(column);
        self
    }

    /// Add a single-column foreign key to the referenced table's `referenced_column`.
    pub fn foreign_key(
        mut self,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        let column = column.into();
        let referenced_table = referenced_table.into();
        self.foreign_keys.push(RawForeignKey {
            name: format!("fk_{}_{}", self.name, column),
            columns: vec![column],
            referenced_table,
            referenced_columns: vec![referenced_column.into()],
        });
        self
    }

    pub fn unique_index(mut self, columns: &[&str]) -> Self {
        self.indexes.push(RawIndex {
            name: format!("uq_{}_{}", self.name, columns.join("_")),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique: true,
            primary: false,
        });
        self
    }

    /// Column rows in ordinal order.
    pub fn column_rows(&self) -> Vec<ColumnRow> {
        let mut rows: Vec<ColumnRow> = self.columns.iter().cloned().map(ColumnRow::from).collect();
        // Stable: rows without positions keep catalog order
        rows.sort_by_key(|row| row.position);
        rows
    }
}
