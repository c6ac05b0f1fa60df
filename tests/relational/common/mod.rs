//! Catalog row builders shared by the relational tests.

#![allow(dead_code)]

use dbscribe::catalog::{RawColumn, RawForeignKey, RawTable};

/// A nullable Postgres column without default.
pub fn pg(position: i32, name: &str, data_type: &str) -> RawColumn {
    RawColumn::Postgres {
        column_name: name.to_string(),
        data_type: data_type.to_string(),
        udt_name: None,
        is_nullable: "YES".to_string(),
        column_default: None,
        is_primary_key: false,
        is_identity: false,
        enum_values: None,
        element_type: None,
        ordinal_position: position,
    }
}

/// A `serial` primary key.
pub fn pg_serial(position: i32, name: &str, table: &str) -> RawColumn {
    let column = pg(position, name, "integer");
    let column = primary_key(not_null(column));
    with_default(column, &format!("nextval('{}_{}_seq'::regclass)", table, name))
}

pub fn not_null(mut column: RawColumn) -> RawColumn {
    if let RawColumn::Postgres { is_nullable, .. } = &mut column {
        *is_nullable = "NO".to_string();
    }
    column
}

pub fn primary_key(mut column: RawColumn) -> RawColumn {
    if let RawColumn::Postgres { is_primary_key, .. } = &mut column {
        *is_primary_key = true;
    }
    column
}

pub fn with_default(mut column: RawColumn, default: &str) -> RawColumn {
    if let RawColumn::Postgres { column_default, .. } = &mut column {
        *column_default = Some(default.to_string());
    }
    column
}

/// `films(id PK, author_id FK -> persons.id, title)`.
pub fn films() -> RawTable {
    RawTable::new("films")
        .column(pg_serial(1, "id", "films"))
        .column(not_null(pg(2, "author_id", "integer")))
        .column(not_null(pg(3, "title", "character varying")))
        .foreign_key("author_id", "persons", "id")
}

/// `persons(id PK, name)`.
pub fn persons() -> RawTable {
    RawTable::new("persons")
        .column(pg_serial(1, "id", "persons"))
        .column(pg(2, "name", "text"))
}

/// A junction table `name(left_col, right_col)` with a composite key.
pub fn junction(name: &str, left: (&str, &str), right: (&str, &str)) -> RawTable {
    RawTable::new(name)
        .column(primary_key(not_null(pg(1, left.0, "integer"))))
        .column(primary_key(not_null(pg(2, right.0, "integer"))))
        .foreign_key(left.0, left.1, "id")
        .foreign_key(right.0, right.1, "id")
}

/// A composite foreign key.
pub fn composite_fk(columns: &[&str], referenced_table: &str, referenced: &[&str]) -> RawForeignKey {
    RawForeignKey {
        name: format!("fk_{}", columns.join("_")),
        columns: columns.iter().map(|c| c.to_string()).collect(),
        referenced_table: referenced_table.to_string(),
        referenced_columns: referenced.iter().map(|c| c.to_string()).collect(),
    }
}
