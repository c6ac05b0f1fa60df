//! Document relationship inference.
//!
//! Two phases per identifier field:
//!
//! ```text
//!   sample ──▶ values ──▶ count matches in every collection (bounded)
//!                                     │
//!                                     ▼
//!                      decide(counts) ─┬─ Resolved(target) ─▶ Reference
//!                                      ├─ Ambiguous(..)     ─▶ nothing
//!                                      └─ NoMatch           ─▶ nothing
//! ```
//!
//! The scan always completes over all collections before deciding, and only
//! a single candidate yields a reference: a missing relationship is
//! preferred over a wrong one.

use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use tracing::debug;

use super::fields::ID_FIELD;
use super::sampler::DocumentSampler;
use super::store::{DocumentStore, StoreResult};
use crate::config::SamplingSettings;
use crate::inflection::strip_id_suffix;
use crate::schema::{Field, Reference, ReferenceKind};

const DEFAULT_SCAN_CONCURRENCY: usize = 4;

/// Outcome of a candidate scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateDecision {
    /// Exactly one collection holds the sampled identifiers.
    Resolved(String),
    /// Several collections do.
    Ambiguous(Vec<String>),
    NoMatch,
}

/// Reduce per-collection match counts to a decision.
pub fn decide(counts: &[(String, u64)]) -> CandidateDecision {
    let mut candidates: Vec<&str> = counts
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(name, _)| name.as_str())
        .collect();

    match candidates.len() {
        0 => CandidateDecision::NoMatch,
        1 => CandidateDecision::Resolved(candidates.remove(0).to_string()),
        _ => CandidateDecision::Ambiguous(candidates.into_iter().map(str::to_string).collect()),
    }
}

/// Infers references of identifier fields against a set of collections.
pub struct ReferenceInferer<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    sampler: DocumentSampler<'a, S>,
    /// Candidate targets, including the collection being analyzed.
    collections: &'a [String],
    /// Counts in flight per scan.
    concurrency: usize,
}

impl<'a, S: DocumentStore + ?Sized> ReferenceInferer<'a, S> {
    pub fn new(store: &'a S, collections: &'a [String], settings: SamplingSettings) -> Self {
        Self {
            store,
            sampler: DocumentSampler::new(store, settings),
            collections,
            concurrency: DEFAULT_SCAN_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Match counts of `values` against the `_id` of every collection,
    /// in collection order.
    pub async fn scan(&self, values: &[Value]) -> StoreResult<Vec<(String, u64)>> {
        let filter = json!({ ID_FIELD: { "$in": values } });
        let filter = &filter;

        let store = self.store;
        let counts: Vec<StoreResult<(String, u64)>> = stream::iter(self.collections)
            .map(move |collection| async move {
                store
                    .count_documents(collection, filter)
                    .await
                    .map(|count| (collection.clone(), count))
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        counts.into_iter().collect()
    }

    /// Infer the reference held by `field` of `entity`, if any.
    ///
    /// Fields that are not identifiers, or are the primary key, never
    /// reference anything.
    pub async fn infer(&self, entity: &str, field: &Field) -> StoreResult<Option<Reference>> {
        if field.is_primary_key || !field.field_type.holds_identifiers() {
            return Ok(None);
        }

        let is_array = field.field_type.is_array();
        let values = self
            .sampler
            .sample_values(entity, &field.column_name, is_array)
            .await?;
        if values.is_empty() {
            debug!(entity, field = %field.column_name, "no values to sample");
            return Ok(None);
        }

        let counts = self.scan(&values).await?;
        match decide(&counts) {
            CandidateDecision::Resolved(target) => Ok(Some(Reference {
                from_entity: entity.to_string(),
                from_field: field.column_name.clone(),
                to_entity: target,
                to_field: None,
                foreign_key: field.column_name.clone(),
                kind: if is_array {
                    ReferenceKind::HasMany
                } else {
                    ReferenceKind::BelongsTo
                },
                alias: strip_id_suffix(&field.column_name)
                    .unwrap_or(&field.column_name)
                    .to_string(),
                through: None,
            })),
            CandidateDecision::Ambiguous(candidates) => {
                debug!(entity, field = %field.column_name, ?candidates, "ambiguous reference");
                Ok(None)
            }
            CandidateDecision::NoMatch => {
                debug!(entity, field = %field.column_name, "no matching collection");
                Ok(None)
            }
        }
    }
}
