//! Relational schema normalizer.
//!
//! Turns the raw catalog rows of one table into an [`Entity`]. Constraints
//! that only matter across tables (foreign keys, single-column unique keys)
//! are handed on to the association resolver as [`TableConstraints`].

use std::collections::HashSet;

use tracing::{debug, warn};

use super::defaults::classify_default;
use super::naming::{
    has_timestamps, is_id_column, is_timestamp_column, is_underscored, logical_name,
};
use super::types::{normalize_column_type, NormalizedType, FALLBACK_TYPE};
use crate::catalog::{RawForeignKey, RawTable};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::schema::{Entity, EntityOptions, Field};

/// Cross-table constraints of one table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableConstraints {
    pub entity: String,
    pub foreign_keys: Vec<RawForeignKey>,
    /// Columns that are unique on their own: single-column unique indexes
    /// and a non-composite primary key.
    pub unique_columns: HashSet<String>,
}

impl TableConstraints {
    pub fn is_unique(&self, column: &str) -> bool {
        self.unique_columns.contains(column)
    }
}

/// A normalized table.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub entity: Entity,
    pub constraints: TableConstraints,
    pub diagnostics: Vec<Diagnostic>,
}

/// Normalize one table.
pub fn normalize_table(table: &RawTable) -> NormalizedTable {
    let rows = table.column_rows();
    let mut diagnostics = Vec::new();

    let underscored = is_underscored(rows.iter().map(|r| r.name.as_str()));

    let index_keys: HashSet<&str> = table
        .indexes
        .iter()
        .filter(|i| i.primary)
        .flat_map(|i| i.columns.iter().map(String::as_str))
        .collect();
    let has_explicit_key = !index_keys.is_empty() || rows.iter().any(|r| r.primary_key);

    let mut fields = Vec::with_capacity(rows.len());
    for row in &rows {
        let normalized = normalize_column_type(row);
        if let NormalizedType::Unsupported(raw_type) = &normalized {
            warn!(table = %table.name, column = %row.name, %raw_type, "unsupported column type");
            diagnostics.push(Diagnostic::new(
                &table.name,
                DiagnosticKind::UnsupportedType {
                    field: row.name.clone(),
                    raw_type: raw_type.clone(),
                    fallback: FALLBACK_TYPE.to_string(),
                },
            ));
        }
        let field_type = normalized.field_type();

        let classified = classify_default(row.default.as_ref(), &field_type);
        if classified.parse_failed {
            let raw_default = row.default.as_ref().map(|d| d.text()).unwrap_or_default();
            debug!(table = %table.name, column = %row.name, raw_default, "default kept as expression");
            diagnostics.push(Diagnostic::new(
                &table.name,
                DiagnosticKind::DefaultValueParse {
                    field: row.name.clone(),
                    raw_default: raw_default.to_string(),
                },
            ));
        }

        // Only the bare `id` stands in for a missing key
        let is_primary_key = row.primary_key
            || index_keys.contains(row.name.as_str())
            || (!has_explicit_key && is_id_column(&row.name));

        fields.push(Field {
            name: logical_name(&row.name, underscored),
            column_name: row.name.clone(),
            field_type,
            is_primary_key,
            is_required: !row.nullable && classified.value.is_none() && !row.auto_increment,
            default_value: classified.value,
        });
    }

    let mut entity = Entity::new(&table.name);
    entity.fields = fields;
    entity.options = EntityOptions {
        has_id_column: entity.fields.iter().any(|f| is_id_column(&f.column_name)),
        has_primary_keys: entity.fields.iter().any(|f| f.is_primary_key),
        is_junction: is_junction(&entity, &table.foreign_keys),
        timestamps: has_timestamps(entity.fields.iter().map(|f| f.column_name.as_str())),
        underscored,
    };

    let mut unique_columns: HashSet<String> = table
        .indexes
        .iter()
        .filter(|i| i.unique && i.columns.len() == 1)
        .map(|i| i.columns[0].clone())
        .collect();
    if let Some(key) = entity.single_primary_key() {
        unique_columns.insert(key.to_string());
    }

    NormalizedTable {
        constraints: TableConstraints {
            entity: table.name.clone(),
            foreign_keys: table.foreign_keys.clone(),
            unique_columns,
        },
        entity,
        diagnostics,
    }
}

/// Whether the entity only links two other entities.
///
/// Timestamp columns are ignored; every remaining column must be part of
/// the primary key and of a foreign key, and the foreign keys must target
/// exactly two distinct entities other than this one.
pub fn is_junction(entity: &Entity, foreign_keys: &[RawForeignKey]) -> bool {
    let fk_columns: HashSet<&str> = foreign_keys
        .iter()
        .flat_map(|fk| fk.columns.iter().map(String::as_str))
        .collect();

    let mut remaining = entity
        .fields
        .iter()
        .filter(|f| !is_timestamp_column(&f.column_name))
        .peekable();
    if remaining.peek().is_none() {
        return false;
    }
    if !remaining.all(|f| f.is_primary_key && fk_columns.contains(f.column_name.as_str())) {
        return false;
    }

    let targets: HashSet<&str> = foreign_keys
        .iter()
        .map(|fk| fk.referenced_table.as_str())
        .collect();
    targets.len() == 2 && !targets.contains(entity.name.as_str())
}
