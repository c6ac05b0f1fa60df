//! In-memory catalog.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::reader::{CatalogReader, CatalogResult};
use super::types::{Dialect, RawTable};
use crate::worker::WorkerError;

/// Failure injected for one table.
#[derive(Debug, Clone)]
enum Failure {
    PermissionDenied(String),
    Connection(String),
}

/// CatalogReader over a fixed set of tables.
///
/// Tables are listed in insertion order. Failures can be injected per table
/// to exercise the analyzer's error policy.
#[derive(Debug, Clone)]
pub struct MemoryCatalog {
    dialect: Dialect,
    tables: Vec<RawTable>,
    failures: BTreeMap<String, Failure>,
    unreachable: bool,
}

impl MemoryCatalog {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: Vec::new(),
            failures: BTreeMap::new(),
            unreachable: false,
        }
    }

    pub fn with_table(mut self, table: RawTable) -> Self {
        self.tables.retain(|t| t.name != table.name);
        self.tables.push(table);
        self
    }

    /// Reading `table` fails with a permission error.
    pub fn deny(mut self, table: impl Into<String>) -> Self {
        let table = table.into();
        let message = format!("permission denied for table {}", table);
        self.failures.insert(table, Failure::PermissionDenied(message));
        self
    }

    /// Reading `table` fails as if the connection dropped.
    pub fn disconnect_on(mut self, table: impl Into<String>) -> Self {
        let table = table.into();
        self.failures
            .insert(table, Failure::Connection("connection reset by peer".to_string()));
        self
    }

    /// Every call fails with a connection error.
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    fn check_reachable(&self) -> CatalogResult<()> {
        if self.unreachable {
            return Err(WorkerError::ConnectionFailed(
                "could not connect to server".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogReader for MemoryCatalog {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn list_tables(&self) -> CatalogResult<Vec<String>> {
        self.check_reachable()?;
        // Denied tables are still listed; only reading them fails
        let mut names: Vec<String> = self.tables.iter().map(|t| t.name.clone()).collect();
        for name in self.failures.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        Ok(names)
    }

    async fn read_table(&self, table: &str) -> CatalogResult<RawTable> {
        self.check_reachable()?;
        match self.failures.get(table) {
            Some(Failure::PermissionDenied(message)) => {
                return Err(WorkerError::PermissionDenied(message.clone()))
            }
            Some(Failure::Connection(message)) => {
                return Err(WorkerError::ConnectionFailed(message.clone()))
            }
            None => {}
        }

        self.tables
            .iter()
            .find(|t| t.name == table)
            .cloned()
            .ok_or_else(|| WorkerError::NotFound(format!("table {}", table)))
    }
}
