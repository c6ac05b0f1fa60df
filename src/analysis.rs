//! Analysis entry points.
//!
//! Picks the pipeline for a database kind and runs it. Settings and the
//! connection are passed in explicitly on every call.

use std::sync::Arc;

use tracing::info;

use crate::catalog::{CatalogReader, WorkerCatalogReader};
use crate::config::{AnalysisSettings, ConnectionSettings, DatabaseKind, SettingsError};
use crate::diagnostics::{AnalysisReport, AnalysisResult};
use crate::document::{DocumentAnalyzer, DocumentStore, WorkerDocumentStore};
use crate::relational::RelationalAnalyzer;
use crate::worker::WorkerClient;

/// Where the schema is read from.
#[derive(Clone, Copy)]
pub enum Source<'a> {
    Catalog(&'a dyn CatalogReader),
    Documents(&'a dyn DocumentStore),
}

impl Source<'_> {
    pub fn kind(&self) -> DatabaseKind {
        match self {
            Source::Catalog(_) => DatabaseKind::Relational,
            Source::Documents(_) => DatabaseKind::Document,
        }
    }
}

/// Run the pipeline matching `source`.
pub async fn analyze(source: Source<'_>, settings: &AnalysisSettings) -> AnalysisResult<AnalysisReport> {
    settings.validate()?;
    match source {
        Source::Catalog(reader) => RelationalAnalyzer::new(reader, settings).analyze().await,
        Source::Documents(store) => DocumentAnalyzer::new(store, settings).analyze().await,
    }
}

/// Analyze the database behind `connection` through the worker.
pub async fn analyze_connection(
    client: Arc<WorkerClient>,
    connection: &ConnectionSettings,
    settings: &AnalysisSettings,
) -> AnalysisResult<AnalysisReport> {
    let driver = connection.driver_type()?;
    let params = connection.to_params()?;
    info!(%driver, schema = ?connection.schema, "starting analysis");

    match driver.kind() {
        DatabaseKind::Relational => {
            let dialect = driver
                .dialect()
                .ok_or_else(|| SettingsError::UnsupportedDriver(driver.to_string()))?;
            let reader = WorkerCatalogReader::new(client, dialect, params);
            analyze(Source::Catalog(&reader), settings).await
        }
        DatabaseKind::Document => {
            let store = WorkerDocumentStore::new(client, params);
            analyze(Source::Documents(&store), settings).await
        }
    }
}
