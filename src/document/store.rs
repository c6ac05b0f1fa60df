//! DocumentStore trait definition.

use async_trait::async_trait;
use serde_json::Value;

use crate::worker::WorkerError;

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, WorkerError>;

/// Read-only access to a document database.
///
/// Documents, pipelines and filters are extended JSON (`{"$oid": ...}`).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List collection names.
    async fn list_collections(&self) -> StoreResult<Vec<String>>;

    /// Run an aggregation pipeline and return the resulting documents.
    async fn aggregate(&self, collection: &str, pipeline: &[Value]) -> StoreResult<Vec<Value>>;

    /// Count documents matching `filter`.
    async fn count_documents(&self, collection: &str, filter: &Value) -> StoreResult<u64>;
}
