//! Document schema analysis.
//!
//! Document stores declare no foreign keys, so references are inferred from
//! data: sample the values of each identifier field, then look for the one
//! collection whose `_id`s contain them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      DocumentAnalyzer                           │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────┐  │
//! │  │ discover_fields │  │ DocumentSampler │  │ReferenceInferer │  │
//! │  │ (extended JSON) │─▶│ ($sample, $slice│─▶│ (scan all, then │  │
//! │  │                 │  │  $unwind, $group│  │  decide once)   │  │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  DocumentStore: WorkerDocumentStore | MemoryDocumentStore       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod analyzer;
mod fields;
mod inference;
mod memory;
mod sampler;
mod store;
mod worker_store;

pub use analyzer::{collection_entity, DocumentAnalyzer};
pub use fields::{discover_fields, value_type, ID_FIELD};
pub use inference::{decide, CandidateDecision, ReferenceInferer};
pub use memory::{MemoryDocumentStore, DEFAULT_SEED};
pub use sampler::{sample_pipeline, DocumentSampler};
pub use store::{DocumentStore, StoreResult};
pub use worker_store::WorkerDocumentStore;
