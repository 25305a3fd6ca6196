//! # Query State
//!
//! The single source of truth for a user-built query: target table,
//! column subset, filters, joins, ordering, and pagination. Fully
//! serializable so the UI can persist and restore it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::operators::FilterOperator;

/// Default interactive page size.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Sort direction for the single order clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// A single filter predicate.
///
/// Identity is the `id`, not the content; two filters may target the
/// same column. For null-test operators `value` is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl Filter {
    /// Create a filter with a fresh identity.
    pub fn new(
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            column: column.into(),
            operator,
            value: value.into(),
        }
    }
}

/// A single-hop foreign key traversal: `from_table.from_column` points at
/// `to_table.to_column`. Joined columns are projected nested under the
/// `to_table` key; an empty `selected_columns` means all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinConfig {
    pub id: String,
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub selected_columns: Vec<String>,
}

impl JoinConfig {
    /// Create a join with a fresh identity, projecting all columns.
    pub fn new(
        from_table: impl Into<String>,
        from_column: impl Into<String>,
        to_table: impl Into<String>,
        to_column: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from_table: from_table.into(),
            from_column: from_column.into(),
            to_table: to_table.into(),
            to_column: to_column.into(),
            selected_columns: Vec::new(),
        }
    }
}

/// The declarative query description the compiler consumes.
///
/// An empty `table` means "no query". An empty `selected_columns` is the
/// sentinel for "all columns", never an empty projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub table: String,
    pub selected_columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub joins: Vec<JoinConfig>,
    pub order_by: String,
    pub order_direction: OrderDirection,
    pub page: u64,
    pub page_size: u64,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            table: String::new(),
            selected_columns: Vec::new(),
            filters: Vec::new(),
            joins: Vec::new(),
            order_by: String::new(),
            order_direction: OrderDirection::Asc,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryState {
    /// Fresh state targeting `table`.
    pub fn for_table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    /// Switch the target table. Columns, filters, joins, ordering and
    /// pagination are scoped to a table and reset when it changes.
    pub fn select_table(&mut self, table: impl Into<String>) {
        let table = table.into();
        if table != self.table {
            let page_size = self.page_size;
            *self = Self {
                table,
                page_size,
                ..Self::default()
            };
        }
    }

    /// Change the page size, returning to the first page.
    pub fn set_page_size(&mut self, page_size: u64) {
        self.page_size = page_size.max(1);
        self.page = 0;
    }
}
