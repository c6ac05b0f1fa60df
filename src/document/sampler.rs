//! Document sampler.
//!
//! Pulls a bounded, randomized set of distinct values of one field. The
//! randomization happens in the store (`$sample`), so insertion order never
//! biases which values are seen, and every query is bounded regardless of
//! collection size.

use serde_json::{json, Value};

use super::store::{DocumentStore, StoreResult};
use crate::config::SamplingSettings;

/// Aggregation pipeline sampling distinct non-null values of `field`.
///
/// Array fields contribute up to `array_elements` leading elements per
/// document.
pub fn sample_pipeline(field: &str, is_array: bool, settings: &SamplingSettings) -> Vec<Value> {
    let path = format!("${}", field);
    let mut pipeline = vec![
        json!({ "$match": { field: { "$ne": null } } }),
        json!({ "$sample": { "size": settings.documents } }),
    ];

    if is_array {
        pipeline.push(json!({
            "$project": { field: { "$slice": [path, settings.array_elements] } }
        }));
        pipeline.push(json!({ "$unwind": path }));
    }

    pipeline.push(json!({ "$match": { field: { "$ne": null } } }));
    pipeline.push(json!({ "$group": { "_id": path } }));
    pipeline.push(json!({ "$limit": settings.sample_size }));
    pipeline
}

/// Samples field values from a document store.
pub struct DocumentSampler<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    settings: SamplingSettings,
}

impl<'a, S: DocumentStore + ?Sized> DocumentSampler<'a, S> {
    pub fn new(store: &'a S, settings: SamplingSettings) -> Self {
        Self { store, settings }
    }

    /// Up to `sample_size` distinct non-null values of `field`.
    ///
    /// Fewer values come back when the field is sparse; an empty result is
    /// not an error.
    pub async fn sample_values(
        &self,
        collection: &str,
        field: &str,
        is_array: bool,
    ) -> StoreResult<Vec<Value>> {
        let pipeline = sample_pipeline(field, is_array, &self.settings);
        let groups = self.store.aggregate(collection, &pipeline).await?;

        Ok(groups
            .into_iter()
            .filter_map(|mut group| group.get_mut("_id").map(Value::take))
            .filter(|value| !value.is_null())
            .take(self.settings.sample_size)
            .collect())
    }
}
