//! Catalog reader module.
//!
//! Reads the raw system catalog of a relational database: column rows,
//! foreign keys and indexes, per table.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        CatalogReader                            │
//! │  - list_tables()            - read_table(name) -> RawTable      │
//! ├────────────────────────────────┬────────────────────────────────┤
//! │  WorkerCatalogReader           │  MemoryCatalog                 │
//! │  (NDJSON RPC to the worker)    │  (fixed rows, injected faults) │
//! └────────────────────────────────┴────────────────────────────────┘
//!                           │ RawColumn (dialect-tagged)
//!                           ▼
//!                  ColumnRow (dialect-free)
//! ```

mod memory;
mod reader;
mod types;
mod worker_reader;

pub use memory::MemoryCatalog;
pub use reader::{CatalogReader, CatalogResult};
pub use types::{
    ColumnRow, Dialect, MySqlColumn, RawColumn, RawDefault, RawForeignKey, RawIndex, RawTable,
};
pub use worker_reader::WorkerCatalogReader;
