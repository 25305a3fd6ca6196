//! # Data Backend Seam
//!
//! The engine consumes a data source through one narrow trait: a single
//! relational fetch primitive with predicates, nested join projection,
//! ordering, row ranges and exact counts, plus column discovery and
//! id/label lookups. Everything above this seam is backend-agnostic.

mod errors;
pub mod memory;

pub use errors::{BackendError, BackendResult};
pub use memory::MemoryBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::query::BackendRequest;

/// A dynamic result row, keyed by column name.
///
/// The set of tables and their columns is data-driven, so rows carry a
/// tagged value per column instead of a compile-time shape.
pub type Row = Map<String, Value>;

/// Raw result of one relational fetch.
#[derive(Debug, Clone, Default)]
pub struct QueryResponse {
    pub rows: Vec<Row>,
    /// Total rows matching the predicates, ignoring the requested range
    pub exact_count: u64,
}

/// Column name and declared type, as reported by the backend catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Id/label fetch against a lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    pub table: String,
    pub id_field: String,
    pub label_field: String,
    /// Restrict to these identifiers; `None` fetches the whole table
    pub ids: Option<Vec<String>>,
    /// Sort ascending by the label field
    pub order_by_label: bool,
}

/// The relational data source the engine runs against.
#[async_trait]
pub trait DataBackend: Send + Sync {
    /// Execute one relational fetch.
    async fn query(&self, request: &BackendRequest) -> BackendResult<QueryResponse>;

    /// Column discovery. Best effort: backends without catalog access may
    /// return an error and let the caller fall back to row sampling.
    async fn fetch_columns_metadata(&self, table: &str) -> BackendResult<Vec<ColumnDescriptor>>;

    /// Fetch id/label pairs from a lookup table.
    async fn lookup(&self, request: &LookupRequest) -> BackendResult<Vec<Row>>;
}

/// Scalar cell rendered as an identifier string; nulls and composites
/// have no identifier form.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
