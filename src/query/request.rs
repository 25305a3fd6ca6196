//! # Compiled Backend Request
//!
//! The deterministic output of the query compiler: everything a data
//! backend needs to run one relational fetch.

use serde::{Deserialize, Serialize};

use super::state::OrderDirection;

/// Column subset for one projection block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnSet {
    /// All columns of the relation
    All,
    /// An explicit column list
    Columns(Vec<String>),
}

impl ColumnSet {
    /// Build from a user selection, treating empty as "all columns".
    pub fn from_selection(columns: &[String]) -> Self {
        if columns.is_empty() {
            ColumnSet::All
        } else {
            ColumnSet::Columns(columns.to_vec())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ColumnSet::All)
    }
}

/// A nested projection block for one joined relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinProjection {
    /// Related table; also the key the block nests under in result rows
    pub table: String,
    /// Column on the base table holding the foreign key
    pub from_column: String,
    /// Column on the related table the key matches
    pub to_column: String,
    pub columns: ColumnSet,
}

/// Requested column shape: base columns plus nested join blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub base: ColumnSet,
    pub joins: Vec<JoinProjection>,
}

/// Comparison semantics of one compiled predicate.
///
/// Comparison values are literal strings throughout; any casting is the
/// backend's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredicateOp {
    Eq(String),
    Neq(String),
    Gt(String),
    Gte(String),
    Lt(String),
    Lte(String),
    /// Pattern containment; the pattern arrives pre-wrapped in `%` wildcards
    Like(String),
    /// Case-insensitive pattern containment
    ILike(String),
    IsNull,
    IsNotNull,
    /// Membership over literal tokens
    In(Vec<String>),
}

/// A single predicate; all predicates of a request AND-combine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub op: PredicateOp,
}

impl Predicate {
    pub fn new(column: impl Into<String>, op: PredicateOp) -> Self {
        Self {
            column: column.into(),
            op,
        }
    }
}

/// Single-column sort clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    pub column: String,
    pub direction: OrderDirection,
}

/// Row range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRange {
    pub from: u64,
    pub to: u64,
}

impl RowRange {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    /// The window for page `page` of `page_size` rows.
    pub fn for_page(page: u64, page_size: u64) -> Self {
        let from = page * page_size;
        Self {
            from,
            to: from + page_size.saturating_sub(1),
        }
    }

    /// Number of rows the range spans.
    pub fn len(&self) -> u64 {
        self.to.saturating_sub(self.from) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.to < self.from
    }
}

/// A fully compiled, backend-executable query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRequest {
    pub table: String,
    pub projection: Projection,
    pub predicates: Vec<Predicate>,
    pub order: Option<OrderSpec>,
    pub range: RowRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_set_from_selection() {
        assert!(ColumnSet::from_selection(&[]).is_all());
        let explicit = ColumnSet::from_selection(&["id".to_string(), "name".to_string()]);
        assert_eq!(
            explicit,
            ColumnSet::Columns(vec!["id".to_string(), "name".to_string()])
        );
    }

    #[test]
    fn test_row_range_for_page() {
        // Page 2 (0-indexed) of 50 rows covers [100, 149].
        let range = RowRange::for_page(2, 50);
        assert_eq!(range.from, 100);
        assert_eq!(range.to, 149);
        assert_eq!(range.len(), 50);
    }

    #[test]
    fn test_row_range_first_page() {
        let range = RowRange::for_page(0, 500);
        assert_eq!(range.from, 0);
        assert_eq!(range.to, 499);
    }
}
