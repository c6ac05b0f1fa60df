//! WorkerDocumentStore implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::store::{DocumentStore, StoreResult};
use crate::worker::protocol::{
    methods, AggregateParams, AggregateResponse, ConnectionParams, CountDocumentsParams,
    CountDocumentsResponse, ListCollectionsParams, ListCollectionsResponse,
};
use crate::worker::WorkerClient;

/// DocumentStore that runs queries through the worker.
pub struct WorkerDocumentStore {
    client: Arc<WorkerClient>,
    connection: ConnectionParams,
}

impl WorkerDocumentStore {
    pub fn new(client: Arc<WorkerClient>, connection: ConnectionParams) -> Self {
        Self { client, connection }
    }
}

#[async_trait]
impl DocumentStore for WorkerDocumentStore {
    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        let params = ListCollectionsParams {
            connection: self.connection.clone(),
        };

        let response: ListCollectionsResponse =
            self.client.request(methods::LIST_COLLECTIONS, params).await?;
        Ok(response.collections)
    }

    async fn aggregate(&self, collection: &str, pipeline: &[Value]) -> StoreResult<Vec<Value>> {
        let params = AggregateParams {
            connection: self.connection.clone(),
            collection: collection.to_string(),
            pipeline: pipeline.to_vec(),
        };

        let response: AggregateResponse = self.client.request(methods::AGGREGATE, params).await?;
        Ok(response.documents)
    }

    async fn count_documents(&self, collection: &str, filter: &Value) -> StoreResult<u64> {
        let params = CountDocumentsParams {
            connection: self.connection.clone(),
            collection: collection.to_string(),
            filter: filter.clone(),
        };

        let response: CountDocumentsResponse =
            self.client.request(methods::COUNT_DOCUMENTS, params).await?;
        Ok(response.count)
    }
}
