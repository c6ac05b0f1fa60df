//! # dbscribe
//!
//! Reverse-engineers a schema model from a live database.
//!
//! ## Architecture
//!
//! Two independent pipelines produce the same model:
//!
//! ```text
//! ┌──────────────────────────────┐      ┌──────────────────────────────┐
//! │   Relational (catalog)       │      │   Document (collections)     │
//! │                              │      │                              │
//! │   CatalogReader              │      │   DocumentStore              │
//! │        │ RawTable            │      │        │ sampled documents   │
//! │        ▼                     │      │        ▼                     │
//! │   normalize_table            │      │   discover_fields            │
//! │        │ Entity              │      │        │ Entity              │
//! │        ▼                     │      │        ▼                     │
//! │   resolve_associations       │      │   DocumentSampler            │
//! │                              │      │   ReferenceInferer           │
//! └──────────────┬───────────────┘      └──────────────┬───────────────┘
//!                │                                     │
//!                ▼                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │   AnalysisReport { Schema (entities, fields, references),           │
//! │                    per-entity diagnostics }                         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both pipelines reach the database through the worker process
//! ([`worker`]) or through in-memory implementations of the same traits.

pub mod analysis;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod inflection;
pub mod relational;
pub mod schema;
pub mod worker;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::analysis::{analyze, analyze_connection, Source};
    pub use crate::catalog::{CatalogReader, Dialect, MemoryCatalog, RawTable};
    pub use crate::config::{AnalysisSettings, ConnectionSettings, Settings};
    pub use crate::diagnostics::{AnalysisError, AnalysisReport, Diagnostic, DiagnosticKind};
    pub use crate::document::{DocumentStore, MemoryDocumentStore};
    pub use crate::schema::{
        DefaultValue, Entity, EntityOptions, Field, FieldType, Reference, ReferenceKind, Schema,
    };
}
