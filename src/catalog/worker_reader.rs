//! WorkerCatalogReader implementation.

use std::sync::Arc;

use async_trait::async_trait;

use super::reader::{CatalogReader, CatalogResult};
use super::types::{Dialect, RawTable};
use crate::worker::protocol::{
    methods, ConnectionParams, GetTableParams, GetTableResponse, ListTablesParams,
    ListTablesResponse,
};
use crate::worker::WorkerClient;

/// CatalogReader that fetches catalog rows through the worker.
///
/// # Example
///
/// ```ignore
/// use dbscribe::catalog::{CatalogReader, Dialect, WorkerCatalogReader};
/// use dbscribe::worker::WorkerClient;
///
/// let client = WorkerClient::spawn_with_settings(&settings.worker).await?;
/// let reader = WorkerCatalogReader::new(Arc::new(client), Dialect::Postgres, params);
///
/// let tables = reader.list_tables().await?;
/// let films = reader.read_table("films").await?;
/// ```
pub struct WorkerCatalogReader {
    client: Arc<WorkerClient>,
    dialect: Dialect,
    connection: ConnectionParams,
}

impl WorkerCatalogReader {
    pub fn new(client: Arc<WorkerClient>, dialect: Dialect, connection: ConnectionParams) -> Self {
        Self {
            client,
            dialect,
            connection,
        }
    }

    /// Get a reference to the underlying worker client.
    pub fn client(&self) -> &WorkerClient {
        &self.client
    }
}

#[async_trait]
impl CatalogReader for WorkerCatalogReader {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn list_tables(&self) -> CatalogResult<Vec<String>> {
        let params = ListTablesParams {
            connection: self.connection.clone(),
        };

        let response: ListTablesResponse = self.client.request(methods::LIST_TABLES, params).await?;
        Ok(response.tables)
    }

    async fn read_table(&self, table: &str) -> CatalogResult<RawTable> {
        let params = GetTableParams {
            connection: self.connection.clone(),
            table: table.to_string(),
        };

        let response: GetTableResponse = self.client.request(methods::GET_TABLE, params).await?;
        Ok(response.table)
    }
}
