//! Document analysis pipeline.
//!
//! ```text
//! list_collections ──▶ $sample × N (bounded, ordered) ──▶ discover_fields
//!                                                             │
//!            identifier fields ──▶ ReferenceInferer (sample, scan, decide)
//!                                                             │
//!                                   Schema + diagnostics ◀────┘
//! ```
//!
//! Every collection that was discovered is a candidate target, including
//! the field's own collection.

use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::fields::{discover_fields, ID_FIELD};
use super::inference::ReferenceInferer;
use super::store::DocumentStore;
use crate::config::AnalysisSettings;
use crate::diagnostics::{
    AnalysisError, AnalysisReport, AnalysisResult, Diagnostic, DiagnosticKind,
};
use crate::relational::{has_timestamps, is_underscored};
use crate::schema::{Entity, EntityOptions, Field, Reference, Schema};

/// Build the entity of one collection from sampled documents.
pub fn collection_entity(name: &str, documents: &[Value]) -> Entity {
    let fields = discover_fields(documents);
    let has_id = fields.iter().any(|f| f.column_name == ID_FIELD);

    let mut entity = Entity::new(name);
    entity.options = EntityOptions {
        has_id_column: has_id,
        has_primary_keys: has_id,
        is_junction: false,
        timestamps: has_timestamps(fields.iter().map(|f| f.column_name.as_str())),
        // `_id` says nothing about the collection's own convention
        underscored: is_underscored(
            fields
                .iter()
                .map(|f| f.column_name.as_str())
                .filter(|c| *c != ID_FIELD),
        ),
    };
    entity.fields = fields;
    entity
}

/// Runs the document pipeline against one store.
pub struct DocumentAnalyzer<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    settings: &'a AnalysisSettings,
}

impl<'a, S: DocumentStore + ?Sized> DocumentAnalyzer<'a, S> {
    pub fn new(store: &'a S, settings: &'a AnalysisSettings) -> Self {
        Self { store, settings }
    }

    pub async fn analyze(&self) -> AnalysisResult<AnalysisReport> {
        let store = self.store;
        let concurrency = self.settings.max_concurrency.max(1);
        let collections = store
            .list_collections()
            .await
            .map_err(AnalysisError::Connection)?;
        info!(collections = collections.len(), "analyzing document store");

        let mut schema = Schema::new();
        let mut diagnostics = Vec::new();

        // Phase 1: fields
        let discovery = vec![json!({ "$sample": { "size": self.settings.sampling.documents } })];
        let discovery = discovery.as_slice();
        let mut reads = stream::iter(collections)
            .map(move |name| async move {
                let result = store.aggregate(&name, discovery).await;
                (name, result)
            })
            .buffered(concurrency);

        while let Some((name, result)) = reads.next().await {
            match result {
                Ok(documents) => {
                    let entity = collection_entity(&name, &documents);
                    debug!(
                        collection = %name,
                        documents = documents.len(),
                        fields = entity.fields.len(),
                        "discovered fields"
                    );
                    schema.insert(entity);
                }
                Err(err) if err.is_connection_error() => {
                    return Err(AnalysisError::Connection(err));
                }
                Err(err) => {
                    warn!(collection = %name, error = %err, "skipping collection");
                    diagnostics.push(Diagnostic::catalog_read(&name, &err));
                }
            }
        }
        drop(reads);

        // Phase 2: references
        let targets: Vec<String> = schema.names().map(str::to_string).collect();
        let inferer = ReferenceInferer::new(store, &targets, self.settings.sampling)
            .with_concurrency(concurrency);
        let inferer = &inferer;

        let jobs: Vec<(String, Field)> = schema
            .iter()
            .flat_map(|entity| {
                entity
                    .fields
                    .iter()
                    .filter(|f| !f.is_primary_key && f.field_type.holds_identifiers())
                    .map(move |f| (entity.name.clone(), f.clone()))
            })
            .collect();
        debug!(fields = jobs.len(), "inferring document references");

        let mut inferred = stream::iter(jobs)
            .map(move |(entity, field)| async move {
                let result = inferer.infer(&entity, &field).await;
                (entity, field, result)
            })
            .buffered(concurrency);

        let mut found: Vec<(String, Reference)> = Vec::new();
        while let Some((entity, field, result)) = inferred.next().await {
            match result {
                Ok(Some(reference)) => {
                    debug!(reference = %reference, "inferred reference");
                    found.push((entity, reference));
                }
                Ok(None) => {}
                Err(err) if err.is_connection_error() => {
                    return Err(AnalysisError::Connection(err));
                }
                Err(err) => {
                    warn!(collection = %entity, field = %field.column_name, error = %err, "sampling failed");
                    diagnostics.push(Diagnostic::new(
                        &entity,
                        DiagnosticKind::SamplingFailed {
                            field: field.column_name.clone(),
                            message: err.to_string(),
                        },
                    ));
                }
            }
        }
        drop(inferred);

        for (entity, reference) in found {
            if let Some(entity) = schema.get_mut(&entity) {
                push_with_unique_alias(&mut entity.references, reference);
            }
        }

        info!(
            entities = schema.len(),
            diagnostics = diagnostics.len(),
            "document analysis finished"
        );
        Ok(AnalysisReport {
            schema,
            diagnostics,
        })
    }
}

/// Append `reference`, falling back to its field name, then a number, when
/// the alias is taken.
fn push_with_unique_alias(references: &mut Vec<Reference>, mut reference: Reference) {
    let taken = |alias: &str, refs: &[Reference]| refs.iter().any(|r| r.alias == alias);

    if taken(&reference.alias, references.as_slice()) {
        if !taken(&reference.foreign_key, references.as_slice()) {
            reference.alias = reference.foreign_key.clone();
        } else {
            let stem = reference.foreign_key.clone();
            let mut n = 2;
            while taken(&format!("{}{}", stem, n), references.as_slice()) {
                n += 1;
            }
            reference.alias = format!("{}{}", stem, n);
        }
    }
    references.push(reference);
}
