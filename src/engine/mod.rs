//! # Execution Engine
//!
//! Everything between a [`crate::query::QueryState`] and a usable result:
//! the execution envelope, foreign-key label resolution, lookup option
//! provisioning, column discovery, and the bulk export driver.

mod cache;
mod columns;
mod engine;
mod export;
mod resolver;

pub use cache::LookupCache;
pub use engine::{QueryEngine, QueryResult};
pub use export::{
    export_filename, flatten_row, rows_to_csv, ProgressFn, EXPORT_PAGE_SIZE, MAX_EXPORT_ROWS,
    MIN_EXPORT_PAGE_SIZE,
};

/// Identifier field every lookup table is keyed by.
pub(crate) const LOOKUP_ID_FIELD: &str = "id";
