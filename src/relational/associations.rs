//! Association resolver.
//!
//! Turns foreign-key constraints into named references on both sides:
//!
//! ```text
//!   films.author_id ──FK──▶ persons.id
//!
//!   films   belongsTo persons  as "author"   (the owning side)
//!   persons hasMany   films    as "films"    (hasOne if author_id is unique)
//! ```
//!
//! Junction tables produce `belongsToMany` between the two linked entities
//! instead of their own `belongsTo` pair. Aliases are then made unique per
//! entity: colliding aliases are prefixed with the foreign-key name, exact
//! duplicates are dropped, and anything still colliding is numbered.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::normalizer::TableConstraints;
use crate::inflection::{join_identifier, plural_of, singularize, strip_id_suffix};
use crate::schema::{Entity, Reference, ReferenceKind, Schema, Through};

/// A reference waiting for its final alias.
#[derive(Debug, Clone)]
struct Candidate {
    reference: Reference,
    /// Foreign-key name used to disambiguate the alias.
    base: String,
}

/// A single-column foreign key whose target is in the schema.
struct Link<'a> {
    column: &'a str,
    target: &'a Entity,
    target_column: String,
}

/// Resolve references for every entity in `schema` from `constraints`.
///
/// Foreign keys pointing at entities missing from the schema are ignored.
pub fn resolve_associations(schema: &mut Schema, constraints: &[TableConstraints]) {
    let mut pending: HashMap<String, Vec<Candidate>> = HashMap::new();

    for table in constraints {
        let Some(owner) = schema.get(&table.entity) else {
            continue;
        };

        let links = single_column_links(schema, table);

        if owner.options.is_junction {
            if let [a, b] = links.as_slice() {
                if a.target.name != b.target.name {
                    let forward = many_to_many(owner, a, b);
                    let backward = many_to_many(owner, b, a);
                    pending.entry(a.target.name.clone()).or_default().push(forward);
                    pending.entry(b.target.name.clone()).or_default().push(backward);
                    continue;
                }
            }
        }

        for link in &links {
            let base = fk_base(link.column);
            let alias = strip_id_suffix(link.column)
                .map(str::to_string)
                .unwrap_or_else(|| singularize(&link.target.name));

            pending.entry(owner.name.clone()).or_default().push(Candidate {
                reference: Reference {
                    from_entity: owner.name.clone(),
                    from_field: link.column.to_string(),
                    to_entity: link.target.name.clone(),
                    to_field: Some(link.target_column.clone()),
                    foreign_key: link.column.to_string(),
                    kind: ReferenceKind::BelongsTo,
                    alias,
                    through: None,
                },
                base: base.clone(),
            });

            let (kind, alias) = if table.is_unique(link.column) {
                (ReferenceKind::HasOne, singularize(&owner.name))
            } else {
                (ReferenceKind::HasMany, plural_of(&owner.name))
            };
            pending
                .entry(link.target.name.clone())
                .or_default()
                .push(Candidate {
                    reference: Reference {
                        from_entity: link.target.name.clone(),
                        from_field: link.target_column.clone(),
                        to_entity: owner.name.clone(),
                        to_field: Some(link.column.to_string()),
                        foreign_key: link.column.to_string(),
                        kind,
                        alias,
                        through: None,
                    },
                    base,
                });
        }
    }

    for entity in schema.iter_mut() {
        let candidates = pending.remove(&entity.name).unwrap_or_default();
        let mut references = settle_aliases(candidates, entity.options.underscored);
        entity.references.append(&mut references);
        debug!(entity = %entity.name, references = entity.references.len(), "resolved associations");
    }
}

fn single_column_links<'a>(schema: &'a Schema, table: &'a TableConstraints) -> Vec<Link<'a>> {
    table
        .foreign_keys
        .iter()
        .filter(|fk| fk.columns.len() == 1)
        .filter_map(|fk| {
            let target = schema.get(&fk.referenced_table)?;
            let target_column = fk
                .referenced_columns
                .first()
                .cloned()
                .or_else(|| target.single_primary_key().map(str::to_string))?;
            Some(Link {
                column: fk.columns[0].as_str(),
                target,
                target_column,
            })
        })
        .collect()
}

/// `belongsToMany` from `from.target` to `to.target` through `junction`.
fn many_to_many(junction: &Entity, from: &Link<'_>, to: &Link<'_>) -> Candidate {
    Candidate {
        reference: Reference {
            from_entity: from.target.name.clone(),
            from_field: from.target_column.clone(),
            to_entity: to.target.name.clone(),
            to_field: Some(to.target_column.clone()),
            foreign_key: from.column.to_string(),
            kind: ReferenceKind::BelongsToMany,
            alias: plural_of(&to.target.name),
            through: Some(Through {
                entity: junction.name.clone(),
                source_key: from.column.to_string(),
                target_key: to.column.to_string(),
            }),
        },
        base: fk_base(to.column),
    }
}

fn fk_base(column: &str) -> String {
    strip_id_suffix(column).unwrap_or(column).to_string()
}

/// Make aliases unique within one entity.
fn settle_aliases(candidates: Vec<Candidate>, underscored: bool) -> Vec<Reference> {
    let mut candidates = dedup(candidates);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for candidate in &candidates {
        *counts.entry(candidate.reference.alias.clone()).or_default() += 1;
    }
    for candidate in &mut candidates {
        if counts[&candidate.reference.alias] < 2 {
            continue;
        }
        let reference = &mut candidate.reference;
        reference.alias = if candidate.base == reference.alias {
            reference.foreign_key.clone()
        } else {
            join_identifier(&candidate.base, &reference.alias, underscored)
        };
    }

    let mut used: HashSet<String> = HashSet::new();
    let mut settled = Vec::with_capacity(candidates.len());
    for candidate in dedup(candidates) {
        let mut reference = candidate.reference;
        if used.contains(&reference.alias) {
            let stem = reference.alias.clone();
            let mut n = 2;
            while used.contains(&format!("{}{}", stem, n)) {
                n += 1;
            }
            reference.alias = format!("{}{}", stem, n);
        }
        used.insert(reference.alias.clone());
        settled.push(reference);
    }
    settled
}

/// Drop exact duplicates, keeping the first occurrence.
fn dedup(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !kept
            .iter()
            .any(|k| k.reference.is_duplicate_of(&candidate.reference))
        {
            kept.push(candidate);
        }
    }
    kept
}
