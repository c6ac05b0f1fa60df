//! Protocol types for worker communication.
//!
//! One JSON envelope per line in each direction. Requests carry the
//! connection parameters so the worker can keep one pool per connection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::RawTable;

// ============================================================================
// Request/Response Envelope
// ============================================================================

/// Request envelope sent to the worker.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope {
    /// Unique request ID for correlation.
    pub id: String,
    /// Method name (e.g., "catalog.get_table").
    pub method: String,
    /// Method-specific parameters.
    pub params: Value,
}

/// Response envelope received from the worker.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    /// Request ID this response corresponds to.
    pub id: String,
    /// Whether the request succeeded.
    pub success: bool,
    /// Result data (present if success = true).
    #[serde(default)]
    pub result: Option<Value>,
    /// Error information (present if success = false).
    #[serde(default)]
    pub error: Option<ErrorInfo>,
}

/// Error information in a failed response.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

/// Method names understood by the worker.
pub mod methods {
    pub const LIST_TABLES: &str = "catalog.list_tables";
    pub const GET_TABLE: &str = "catalog.get_table";
    pub const LIST_COLLECTIONS: &str = "document.list_collections";
    pub const AGGREGATE: &str = "document.aggregate";
    pub const COUNT_DOCUMENTS: &str = "document.count_documents";
}

/// Error codes the worker reports.
pub mod codes {
    pub const CONNECTION_FAILED: &str = "CONNECTION_FAILED";
    pub const AUTH_FAILED: &str = "AUTH_FAILED";
    pub const DRIVER_NOT_FOUND: &str = "DRIVER_NOT_FOUND";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const METHOD_NOT_FOUND: &str = "METHOD_NOT_FOUND";
    pub const WORKER_EXITED: &str = "WORKER_EXITED";
}

// ============================================================================
// Connection Parameters (included in all requests)
// ============================================================================

/// Database connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    /// Driver name (e.g., "postgres", "mongodb").
    pub driver: String,
    /// Driver-specific connection string.
    pub connection_string: String,
    /// Schema or database to introspect; driver default if absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

// ============================================================================
// Catalog
// ============================================================================

/// Parameters for `catalog.list_tables`.
#[derive(Debug, Clone, Serialize)]
pub struct ListTablesParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
}

/// Response from `catalog.list_tables`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListTablesResponse {
    pub tables: Vec<String>,
}

/// Parameters for `catalog.get_table`.
#[derive(Debug, Clone, Serialize)]
pub struct GetTableParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    pub table: String,
}

/// Response from `catalog.get_table`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetTableResponse {
    pub table: RawTable,
}

// ============================================================================
// Document store
// ============================================================================

/// Parameters for `document.list_collections`.
#[derive(Debug, Clone, Serialize)]
pub struct ListCollectionsParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
}

/// Response from `document.list_collections`.
#[derive(Debug, Clone, Deserialize)]
pub struct ListCollectionsResponse {
    pub collections: Vec<String>,
}

/// Parameters for `document.aggregate`.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    pub collection: String,
    /// Aggregation stages in extended JSON.
    pub pipeline: Vec<Value>,
}

/// Response from `document.aggregate`.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateResponse {
    pub documents: Vec<Value>,
}

/// Parameters for `document.count_documents`.
#[derive(Debug, Clone, Serialize)]
pub struct CountDocumentsParams {
    #[serde(flatten)]
    pub connection: ConnectionParams,
    pub collection: String,
    pub filter: Value,
}

/// Response from `document.count_documents`.
#[derive(Debug, Clone, Deserialize)]
pub struct CountDocumentsResponse {
    pub count: u64,
}
