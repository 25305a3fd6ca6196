//! # Schema Registry
//!
//! Static mapping of tables to business groups, joinable foreign keys,
//! and id-to-label lookup sources. Pure data plus accessors; nothing
//! here talks to the backend.

mod builtin;
mod registry;
mod types;

pub use registry::{SchemaRegistry, UNGROUPED_LABEL};
pub use types::{ColumnMeta, ForeignKeyRef, LookupOption, LookupSpec, MandatoryFilter};
