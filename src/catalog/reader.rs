//! CatalogReader trait definition.
//!
//! The CatalogReader trait abstracts over where catalog rows come from. The
//! primary implementation talks to the worker; [`MemoryCatalog`] serves
//! fixed rows for tests and offline analysis.
//!
//! [`MemoryCatalog`]: super::MemoryCatalog

use async_trait::async_trait;

use super::types::{Dialect, RawTable};
use crate::worker::WorkerError;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, WorkerError>;

/// Read-only access to a relational catalog.
///
/// Implementations must be safe to call concurrently: the analyzer reads
/// several tables at once.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Dialect of the rows this reader returns.
    fn dialect(&self) -> Dialect;

    /// List table names visible in the configured schema.
    async fn list_tables(&self) -> CatalogResult<Vec<String>>;

    /// Read columns, foreign keys and indexes of one table.
    async fn read_table(&self, table: &str) -> CatalogResult<RawTable>;
}
