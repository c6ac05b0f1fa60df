//! Relational schema analysis.
//!
//! Normalizes catalog rows into entities, then resolves foreign keys into
//! references between them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     RelationalAnalyzer                          │
//! │  ┌────────────────────────────┐  ┌───────────────────────────┐  │
//! │  │  Normalizer (per table)    │  │  Association resolver     │  │
//! │  │  - types    (type tags)    │  │  (across tables)          │  │
//! │  │  - defaults (literal/expr) │─▶│  - belongsTo / hasMany    │  │
//! │  │  - naming   (underscored)  │  │  - belongsToMany          │  │
//! │  │  - keys, junctions         │  │  - alias uniqueness       │  │
//! │  └────────────────────────────┘  └───────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod analyzer;
mod associations;
mod defaults;
mod naming;
mod normalizer;
mod types;

pub use analyzer::RelationalAnalyzer;
pub use associations::resolve_associations;
pub use defaults::{classify_default, Classified};
pub use naming::{has_timestamps, is_underscored, logical_name, NamingStyle};
pub use normalizer::{is_junction, normalize_table, NormalizedTable, TableConstraints};
pub use types::{normalize_column_type, normalize_type_name, NormalizedType};
