//! In-memory document store.
//!
//! Interprets the aggregation stages the sampler and field discovery emit
//! (`$match`, `$sample`, `$project` with `$slice`, `$unwind`, `$group`,
//! `$limit`) over documents held in memory. `$sample` draws from a seeded
//! RNG, so two stores built with the same seed and documents answer the same
//! sequence of queries identically.

use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{Map, Value};

use super::store::{DocumentStore, StoreResult};
use crate::worker::WorkerError;

/// Seed used by [`MemoryDocumentStore::new`].
pub const DEFAULT_SEED: u64 = 0x5eed;

/// DocumentStore over documents held in memory.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    collections: Vec<(String, Vec<Value>)>,
    rng: Mutex<StdRng>,
    denied: BTreeSet<String>,
    failing_counts: BTreeSet<String>,
    unreachable: bool,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            collections: Vec::new(),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            denied: BTreeSet::new(),
            failing_counts: BTreeSet::new(),
            unreachable: false,
        }
    }

    /// Add a collection; collections are listed in insertion order.
    pub fn with_collection(mut self, name: impl Into<String>, documents: Vec<Value>) -> Self {
        let name = name.into();
        self.collections.retain(|(n, _)| *n != name);
        self.collections.push((name, documents));
        self
    }

    /// Aggregations on `collection` fail with a permission error.
    pub fn deny(mut self, collection: impl Into<String>) -> Self {
        self.denied.insert(collection.into());
        self
    }

    /// Counting documents in `collection` fails with a remote error.
    pub fn fail_counts_on(mut self, collection: impl Into<String>) -> Self {
        self.failing_counts.insert(collection.into());
        self
    }

    /// Every call fails with a connection error.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    fn check_reachable(&self) -> StoreResult<()> {
        if self.unreachable {
            return Err(WorkerError::ConnectionFailed(
                "server selection timed out".to_string(),
            ));
        }
        Ok(())
    }

    fn documents(&self, collection: &str) -> &[Value] {
        self.collections
            .iter()
            .find(|(name, _)| name == collection)
            .map(|(_, docs)| docs.as_slice())
            .unwrap_or_default()
    }

    fn run_stage(&self, docs: Vec<Value>, stage: &Value) -> StoreResult<Vec<Value>> {
        let (name, spec) = stage
            .as_object()
            .filter(|o| o.len() == 1)
            .and_then(|o| o.iter().next())
            .ok_or_else(|| WorkerError::InvalidRequest(format!("malformed stage: {}", stage)))?;

        match name.as_str() {
            "$match" => Ok(docs.into_iter().filter(|d| matches_filter(d, spec)).collect()),
            "$sample" => {
                let size = usize_field(spec, "size")?;
                let mut docs = docs;
                let mut rng = self
                    .rng
                    .lock()
                    .map_err(|_| WorkerError::remote("INTERNAL", "sampler lock poisoned"))?;
                docs.shuffle(&mut *rng);
                docs.truncate(size);
                Ok(docs)
            }
            "$project" => docs.iter().map(|d| project(d, spec)).collect(),
            "$unwind" => {
                let path = spec
                    .as_str()
                    .or_else(|| spec.get("path").and_then(Value::as_str))
                    .and_then(|p| p.strip_prefix('$'))
                    .ok_or_else(|| WorkerError::InvalidRequest("$unwind needs a path".into()))?;
                Ok(docs.into_iter().flat_map(|d| unwind(d, path)).collect())
            }
            "$group" => {
                let path = spec
                    .get("_id")
                    .and_then(Value::as_str)
                    .and_then(|p| p.strip_prefix('$'))
                    .ok_or_else(|| {
                        WorkerError::InvalidRequest("$group only groups by a field".into())
                    })?;
                let mut seen: Vec<Value> = Vec::new();
                for doc in &docs {
                    let key = doc.get(path).cloned().unwrap_or(Value::Null);
                    if !seen.contains(&key) {
                        seen.push(key);
                    }
                }
                Ok(seen
                    .into_iter()
                    .map(|key| serde_json::json!({ "_id": key }))
                    .collect())
            }
            "$limit" => {
                let limit = spec
                    .as_u64()
                    .ok_or_else(|| WorkerError::InvalidRequest("$limit needs a number".into()))?;
                Ok(docs.into_iter().take(limit as usize).collect())
            }
            other => Err(WorkerError::InvalidRequest(format!(
                "unsupported stage {}",
                other
            ))),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        self.check_reachable()?;
        Ok(self.collections.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn aggregate(&self, collection: &str, pipeline: &[Value]) -> StoreResult<Vec<Value>> {
        self.check_reachable()?;
        if self.denied.contains(collection) {
            return Err(WorkerError::PermissionDenied(format!(
                "not authorized on {}",
                collection
            )));
        }

        let mut docs = self.documents(collection).to_vec();
        for stage in pipeline {
            docs = self.run_stage(docs, stage)?;
        }
        Ok(docs)
    }

    async fn count_documents(&self, collection: &str, filter: &Value) -> StoreResult<u64> {
        self.check_reachable()?;
        if self.failing_counts.contains(collection) || self.denied.contains(collection) {
            return Err(WorkerError::remote(
                "QUERY_FAILED",
                format!("count on {} failed", collection),
            ));
        }

        let count = self
            .documents(collection)
            .iter()
            .filter(|d| matches_filter(d, filter))
            .count();
        Ok(count as u64)
    }
}

fn usize_field(spec: &Value, key: &str) -> StoreResult<usize> {
    spec.get(key)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| WorkerError::InvalidRequest(format!("missing numeric '{}'", key)))
}

/// Whether `doc` satisfies a filter of `{field: value | {op: arg}}` terms.
fn matches_filter(doc: &Value, filter: &Value) -> bool {
    let Some(terms) = filter.as_object() else {
        return false;
    };
    terms
        .iter()
        .all(|(path, condition)| matches_condition(doc.get(path), condition))
}

fn matches_condition(value: Option<&Value>, condition: &Value) -> bool {
    let operators = condition
        .as_object()
        .filter(|o| !o.is_empty() && o.keys().all(|k| is_query_operator(k)));

    let Some(operators) = operators else {
        return value.is_some_and(|v| equals_or_contains(v, condition));
    };

    operators.iter().all(|(op, arg)| match op.as_str() {
        "$exists" => value.is_some() == arg.as_bool().unwrap_or(true),
        // Missing fields compare equal to null
        "$ne" => !equals_or_contains(value.unwrap_or(&Value::Null), arg),
        "$in" => {
            let candidates = arg.as_array().map(Vec::as_slice).unwrap_or_default();
            value.is_some_and(|v| match v {
                Value::Array(items) => items.iter().any(|item| candidates.contains(item)),
                other => candidates.contains(other),
            })
        }
        _ => false,
    })
}

fn is_query_operator(key: &str) -> bool {
    matches!(key, "$exists" | "$ne" | "$in")
}

fn equals_or_contains(value: &Value, expected: &Value) -> bool {
    value == expected || value.as_array().is_some_and(|items| items.contains(expected))
}

/// Apply a `$project` specification.
fn project(doc: &Value, spec: &Value) -> StoreResult<Value> {
    let spec = spec
        .as_object()
        .ok_or_else(|| WorkerError::InvalidRequest("$project needs an object".into()))?;

    let mut out = Map::new();
    let id_rule = spec.get("_id");
    let keep_id = id_rule != Some(&Value::Bool(false)) && id_rule.and_then(Value::as_i64) != Some(0);
    if keep_id {
        if let Some(id) = doc.get("_id") {
            out.insert("_id".to_string(), id.clone());
        }
    }

    for (key, rule) in spec {
        if key == "_id" {
            continue;
        }
        let value = match rule {
            Value::Bool(true) => doc.get(key).cloned(),
            Value::Number(n) if n.as_i64() == Some(1) => doc.get(key).cloned(),
            Value::String(path) => path.strip_prefix('$').and_then(|p| doc.get(p)).cloned(),
            Value::Object(expr) => match expr.get("$slice") {
                Some(Value::Array(args)) => slice(doc, args)?,
                _ => {
                    return Err(WorkerError::InvalidRequest(format!(
                        "unsupported projection for {}",
                        key
                    )))
                }
            },
            _ => None,
        };
        if let Some(value) = value {
            out.insert(key.clone(), value);
        }
    }
    Ok(Value::Object(out))
}

/// `{"$slice": ["$path", n]}`: the first `n` elements of an array.
fn slice(doc: &Value, args: &[Value]) -> StoreResult<Option<Value>> {
    let (Some(path), Some(n)) = (
        args.first()
            .and_then(Value::as_str)
            .and_then(|p| p.strip_prefix('$')),
        args.get(1).and_then(Value::as_u64),
    ) else {
        return Err(WorkerError::InvalidRequest(
            "$slice needs a path and a count".into(),
        ));
    };

    Ok(match doc.get(path) {
        Some(Value::Array(items)) => Some(Value::Array(
            items.iter().take(n as usize).cloned().collect(),
        )),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.clone()),
    })
}

/// One document per element of the array at `path`; missing, null and
/// empty arrays produce nothing.
fn unwind(doc: Value, path: &str) -> Vec<Value> {
    match doc.get(path) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                let mut copy = doc.clone();
                if let Some(obj) = copy.as_object_mut() {
                    obj.insert(path.to_string(), item.clone());
                }
                copy
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(_) => vec![doc],
    }
}
