//! tablescope - a read-only data exploration engine over a relational backend
//!
//! Takes a declarative, user-editable query description (table, column
//! subset, filters, joins, ordering, pagination), compiles it into a
//! backend request, executes it, resolves foreign-key identifiers into
//! labels, and exposes consistent pagination and bulk-export semantics.

pub mod backend;
pub mod engine;
pub mod query;
pub mod schema;
