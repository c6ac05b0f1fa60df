//! Relationships between entities.

use std::fmt;

use serde::Serialize;

/// Cardinality of a reference, named after the association it becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReferenceKind {
    BelongsTo,
    HasOne,
    HasMany,
    BelongsToMany,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BelongsTo => write!(f, "belongsTo"),
            Self::HasOne => write!(f, "hasOne"),
            Self::HasMany => write!(f, "hasMany"),
            Self::BelongsToMany => write!(f, "belongsToMany"),
        }
    }
}

/// Junction table behind a `belongsToMany` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Through {
    /// Junction entity name.
    pub entity: String,
    /// Junction column pointing at the owning entity.
    pub source_key: String,
    /// Junction column pointing at the target entity.
    pub target_key: String,
}

/// A directed relationship from one entity to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub from_entity: String,
    pub from_field: String,
    pub to_entity: String,
    /// Target key; `None` means the target's primary key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_field: Option<String>,
    /// Column holding the foreign key, on whichever side it lives.
    pub foreign_key: String,
    #[serde(rename = "cardinality")]
    pub kind: ReferenceKind,
    /// Unique among the references of `from_entity`.
    pub alias: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub through: Option<Through>,
}

impl Reference {
    /// Whether two references carry the same semantics and the same alias.
    ///
    /// Deduplication only ever drops exact matches.
    pub fn is_duplicate_of(&self, other: &Reference) -> bool {
        self == other
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -{}-> {} as {}",
            self.from_entity, self.from_field, self.kind, self.to_entity, self.alias
        )
    }
}
