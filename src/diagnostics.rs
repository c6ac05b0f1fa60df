//! Analysis outcomes: fatal errors and per-entity diagnostics.
//!
//! Connection-scoped failures abort a run and surface as [`AnalysisError`].
//! Everything scoped to one entity is recorded as a [`Diagnostic`] next to the
//! best-effort schema, so callers can decide whether partial results are
//! acceptable.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::config::SettingsError;
use crate::schema::Schema;
use crate::worker::WorkerError;

/// Result type for a whole analysis run.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Failures that abort an analysis run.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The database could not be reached or authenticated against.
    #[error("connection error: {0}")]
    Connection(#[source] WorkerError),

    /// The run was misconfigured before any database call was made.
    #[error("configuration error: {0}")]
    Config(#[from] SettingsError),
}

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The entity was skipped.
    Error,
    /// The entity was emitted with a fallback.
    Warning,
}

/// What went wrong for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Metadata for the entity could not be read; it is missing from the schema.
    CatalogRead { message: String },
    /// A column type has no normalized mapping; the field uses a fallback type.
    UnsupportedType {
        field: String,
        raw_type: String,
        fallback: String,
    },
    /// A default could not be classified; it is kept as an opaque expression.
    DefaultValueParse { field: String, raw_default: String },
    /// Values of a document field could not be sampled or scanned.
    SamplingFailed { field: String, message: String },
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::CatalogRead { .. } => Severity::Error,
            Self::UnsupportedType { .. }
            | Self::DefaultValueParse { .. }
            | Self::SamplingFailed { .. } => Severity::Warning,
        }
    }
}

/// A diagnostic recorded against an entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub entity: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn new(entity: impl Into<String>, kind: DiagnosticKind) -> Self {
        Self {
            entity: entity.into(),
            kind,
        }
    }

    pub fn catalog_read(entity: impl Into<String>, error: &WorkerError) -> Self {
        Self::new(
            entity,
            DiagnosticKind::CatalogRead {
                message: error.to_string(),
            },
        )
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::CatalogRead { message } => {
                write!(f, "{}: could not read metadata: {}", self.entity, message)
            }
            DiagnosticKind::UnsupportedType {
                field,
                raw_type,
                fallback,
            } => write!(
                f,
                "{}.{}: unsupported type '{}', using {}",
                self.entity, field, raw_type, fallback
            ),
            DiagnosticKind::DefaultValueParse { field, raw_default } => write!(
                f,
                "{}.{}: could not parse default '{}', kept as expression",
                self.entity, field, raw_default
            ),
            DiagnosticKind::SamplingFailed { field, message } => {
                write!(f, "{}.{}: sampling failed: {}", self.entity, field, message)
            }
        }
    }
}

/// Outcome of a successful analysis run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisReport {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    /// Whether every listed entity made it into the schema.
    pub fn is_complete(&self) -> bool {
        !self.diagnostics.iter().any(Diagnostic::is_error)
    }

    /// Diagnostics recorded against one entity.
    pub fn diagnostics_for<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.entity == entity)
    }
}
