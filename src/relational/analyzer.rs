//! Relational analysis pipeline.
//!
//! ```text
//! list_tables ──▶ read_table × N (bounded, ordered) ──▶ normalize_table
//!                                                          │
//!                    Schema + diagnostics ◀── resolve_associations
//! ```
//!
//! Listing failures and connection-scoped read failures abort the run. Any
//! other read failure skips that table and is recorded as a diagnostic.

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use super::associations::resolve_associations;
use super::normalizer::normalize_table;
use crate::catalog::CatalogReader;
use crate::config::AnalysisSettings;
use crate::diagnostics::{AnalysisError, AnalysisReport, AnalysisResult, Diagnostic};
use crate::schema::Schema;

/// Runs the relational pipeline against one catalog.
pub struct RelationalAnalyzer<'a, R: CatalogReader + ?Sized> {
    reader: &'a R,
    settings: &'a AnalysisSettings,
}

impl<'a, R: CatalogReader + ?Sized> RelationalAnalyzer<'a, R> {
    pub fn new(reader: &'a R, settings: &'a AnalysisSettings) -> Self {
        Self { reader, settings }
    }

    pub async fn analyze(&self) -> AnalysisResult<AnalysisReport> {
        let reader = self.reader;
        let tables = reader.list_tables().await.map_err(AnalysisError::Connection)?;
        info!(dialect = %reader.dialect(), tables = tables.len(), "analyzing catalog");

        let mut reads = stream::iter(tables)
            .map(move |name| async move {
                let result = reader.read_table(&name).await;
                (name, result)
            })
            .buffered(self.settings.max_concurrency.max(1));

        let mut schema = Schema::new();
        let mut constraints = Vec::new();
        let mut diagnostics = Vec::new();

        while let Some((name, result)) = reads.next().await {
            match result {
                Ok(raw) => {
                    let normalized = normalize_table(&raw);
                    debug!(
                        table = %name,
                        fields = normalized.entity.fields.len(),
                        junction = normalized.entity.options.is_junction,
                        "normalized table"
                    );
                    diagnostics.extend(normalized.diagnostics);
                    constraints.push(normalized.constraints);
                    schema.insert(normalized.entity);
                }
                Err(err) if err.is_connection_error() => {
                    return Err(AnalysisError::Connection(err));
                }
                Err(err) => {
                    warn!(table = %name, error = %err, "skipping table");
                    diagnostics.push(Diagnostic::catalog_read(&name, &err));
                }
            }
        }

        resolve_associations(&mut schema, &constraints);

        info!(
            entities = schema.len(),
            diagnostics = diagnostics.len(),
            "relational analysis finished"
        );
        Ok(AnalysisReport {
            schema,
            diagnostics,
        })
    }
}
