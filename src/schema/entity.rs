//! Tables and collections.

use serde::Serialize;

use super::{Field, Reference};

/// Structural flags of an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityOptions {
    pub has_id_column: bool,
    pub has_primary_keys: bool,
    pub is_junction: bool,
    pub timestamps: bool,
    pub underscored: bool,
}

/// A table or collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub name: String,
    /// Fields in discovery order.
    pub fields: Vec<Field>,
    pub references: Vec<Reference>,
    pub options: EntityOptions,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            references: Vec::new(),
            options: EntityOptions::default(),
        }
    }

    /// Look up a field by its raw column name.
    pub fn field(&self, column_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.column_name == column_name)
    }

    /// Primary key fields in discovery order.
    pub fn primary_keys(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_primary_key)
    }

    /// Column name of the single primary key, if the key is not composite.
    pub fn single_primary_key(&self) -> Option<&str> {
        let mut keys = self.primary_keys();
        match (keys.next(), keys.next()) {
            (Some(key), None) => Some(key.column_name.as_str()),
            _ => None,
        }
    }

    /// Look up a reference by alias.
    pub fn reference(&self, alias: &str) -> Option<&Reference> {
        self.references.iter().find(|r| r.alias == alias)
    }
}
