//! # In-Memory Backend
//!
//! A [`DataBackend`] over plain in-memory tables. Implements the full
//! request semantics (predicate matching with implicit casting, nested
//! join projection, deterministic ordering, inclusive ranges, and exact
//! counts) and backs the crate's test suites.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::query::{
    BackendRequest, ColumnSet, JoinProjection, OrderDirection, OrderSpec, Predicate, PredicateOp,
};

use super::{
    scalar_to_string, BackendError, BackendResult, ColumnDescriptor, DataBackend, LookupRequest,
    QueryResponse, Row,
};

/// In-memory tables with optional declared column metadata.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    tables: HashMap<String, Vec<Row>>,
    columns: HashMap<String, Vec<ColumnDescriptor>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table's rows. Non-object values are discarded.
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Value>) -> Self {
        let rows = rows
            .into_iter()
            .filter_map(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.tables.insert(name.into(), rows);
        self
    }

    /// Declare column metadata for a table. Tables without declarations
    /// report a catalog error, forcing callers into sampling-based
    /// discovery.
    pub fn with_columns(
        mut self,
        table: impl Into<String>,
        columns: Vec<ColumnDescriptor>,
    ) -> Self {
        self.columns.insert(table.into(), columns);
        self
    }

    fn rows_for(&self, table: &str) -> BackendResult<&Vec<Row>> {
        self.tables
            .get(table)
            .ok_or_else(|| BackendError::Execution(format!("relation \"{table}\" does not exist")))
    }

    fn project_row(&self, row: &Row, request: &BackendRequest) -> Row {
        let mut projected = match &request.projection.base {
            ColumnSet::All => row.clone(),
            ColumnSet::Columns(columns) => columns
                .iter()
                .filter_map(|column| row.get(column).map(|value| (column.clone(), value.clone())))
                .collect(),
        };

        for join in &request.projection.joins {
            projected.insert(join.table.clone(), self.embed_join(row, join));
        }

        projected
    }

    /// Embed the first related row whose `to_column` equals the base
    /// row's key, projected to the join's column set. Unmatched or
    /// null keys embed as null.
    fn embed_join(&self, row: &Row, join: &JoinProjection) -> Value {
        let key = match row.get(&join.from_column) {
            Some(value) if !value.is_null() => value,
            _ => return Value::Null,
        };
        let Some(related_rows) = self.tables.get(&join.table) else {
            return Value::Null;
        };

        for related in related_rows {
            if related.get(&join.to_column) == Some(key) {
                let block: Row = match &join.columns {
                    ColumnSet::All => related.clone(),
                    ColumnSet::Columns(columns) => columns
                        .iter()
                        .filter_map(|column| {
                            related.get(column).map(|value| (column.clone(), value.clone()))
                        })
                        .collect(),
                };
                return Value::Object(block);
            }
        }

        Value::Null
    }
}

#[async_trait]
impl DataBackend for MemoryBackend {
    async fn query(&self, request: &BackendRequest) -> BackendResult<QueryResponse> {
        let rows = self.rows_for(&request.table)?;

        let mut matched: Vec<&Row> = rows
            .iter()
            .filter(|row| matches_predicates(row, &request.predicates))
            .collect();
        let exact_count = matched.len() as u64;

        if let Some(order) = &request.order {
            sort_rows(&mut matched, order);
        }

        let page = matched
            .into_iter()
            .skip(request.range.from as usize)
            .take(request.range.len() as usize)
            .map(|row| self.project_row(row, request))
            .collect();

        Ok(QueryResponse {
            rows: page,
            exact_count,
        })
    }

    async fn fetch_columns_metadata(&self, table: &str) -> BackendResult<Vec<ColumnDescriptor>> {
        self.columns
            .get(table)
            .cloned()
            .ok_or_else(|| BackendError::Execution(format!("no column metadata for \"{table}\"")))
    }

    async fn lookup(&self, request: &LookupRequest) -> BackendResult<Vec<Row>> {
        let rows = self.rows_for(&request.table)?;

        let mut pairs: Vec<Row> = rows
            .iter()
            .filter(|row| match &request.ids {
                None => true,
                Some(ids) => row
                    .get(&request.id_field)
                    .and_then(scalar_to_string)
                    .is_some_and(|id| ids.contains(&id)),
            })
            .map(|row| {
                let mut pair = Row::new();
                for field in [&request.id_field, &request.label_field] {
                    if let Some(value) = row.get(field) {
                        pair.insert(field.clone(), value.clone());
                    }
                }
                pair
            })
            .collect();

        if request.order_by_label {
            pairs.sort_by(|a, b| {
                let a_label = a.get(&request.label_field).and_then(scalar_to_string);
                let b_label = b.get(&request.label_field).and_then(scalar_to_string);
                a_label.cmp(&b_label)
            });
        }

        Ok(pairs)
    }
}

/// All predicates must match (AND semantics).
fn matches_predicates(row: &Row, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|predicate| matches_predicate(row, predicate))
}

fn matches_predicate(row: &Row, predicate: &Predicate) -> bool {
    let cell = row.get(&predicate.column);

    match &predicate.op {
        PredicateOp::IsNull => matches!(cell, None | Some(Value::Null)),
        PredicateOp::IsNotNull => matches!(cell, Some(value) if !value.is_null()),
        op => {
            // Missing and null cells match nothing but null tests.
            let Some(value) = cell else { return false };
            if value.is_null() {
                return false;
            }
            match op {
                PredicateOp::Eq(literal) => compare_literal(value, literal) == Some(Ordering::Equal),
                PredicateOp::Neq(literal) => {
                    matches!(compare_literal(value, literal), Some(ordering) if ordering != Ordering::Equal)
                }
                PredicateOp::Gt(literal) => compare_literal(value, literal) == Some(Ordering::Greater),
                PredicateOp::Gte(literal) => matches!(
                    compare_literal(value, literal),
                    Some(Ordering::Greater) | Some(Ordering::Equal)
                ),
                PredicateOp::Lt(literal) => compare_literal(value, literal) == Some(Ordering::Less),
                PredicateOp::Lte(literal) => matches!(
                    compare_literal(value, literal),
                    Some(Ordering::Less) | Some(Ordering::Equal)
                ),
                PredicateOp::Like(pattern) => value
                    .as_str()
                    .is_some_and(|text| matches_like_pattern(text, pattern)),
                PredicateOp::ILike(pattern) => value.as_str().is_some_and(|text| {
                    matches_like_pattern(&text.to_lowercase(), &pattern.to_lowercase())
                }),
                PredicateOp::In(tokens) => {
                    scalar_to_string(value).is_some_and(|text| tokens.contains(&text))
                }
                PredicateOp::IsNull | PredicateOp::IsNotNull => unreachable!(),
            }
        }
    }
}

/// Compare a cell against a literal string, casting the literal to the
/// cell's type. Untyped comparisons (objects, arrays) never match.
fn compare_literal(value: &Value, literal: &str) -> Option<Ordering> {
    match value {
        Value::Number(number) => {
            let cell = number.as_f64()?;
            let literal: f64 = literal.trim().parse().ok()?;
            cell.partial_cmp(&literal)
        }
        Value::String(text) => Some(text.as_str().cmp(literal)),
        Value::Bool(cell) => {
            let literal: bool = literal.parse().ok()?;
            Some(cell.cmp(&literal))
        }
        _ => None,
    }
}

/// SQL LIKE matching restricted to `%` wildcards; other characters are
/// literal.
fn matches_like_pattern(value: &str, pattern: &str) -> bool {
    let segments: Vec<&str> = pattern.split('%').collect();
    if segments.len() == 1 {
        return value == pattern;
    }

    let mut rest = value;
    let first = segments[0];
    if !first.is_empty() {
        match rest.strip_prefix(first) {
            Some(stripped) => rest = stripped,
            None => return false,
        }
    }

    let last = segments[segments.len() - 1];
    for segment in &segments[1..segments.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(position) => rest = &rest[position + segment.len()..],
            None => return false,
        }
    }

    last.is_empty() || rest.ends_with(last)
}

/// Stable, deterministic sort. Values order by type first (null < bool <
/// number < string), then naturally within a type.
fn sort_rows(rows: &mut [&Row], order: &OrderSpec) {
    rows.sort_by(|a, b| {
        let ordering = compare_cells(a.get(&order.column), b.get(&order.column));
        match order.direction {
            OrderDirection::Asc => ordering,
            OrderDirection::Desc => ordering.reverse(),
        }
    });
}

fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let type_order = |value: &Value| -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    };

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            let by_type = type_order(a).cmp(&type_order(b));
            if by_type != Ordering::Equal {
                return by_type;
            }
            match (a, b) {
                (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
                (Value::Number(a), Value::Number(b)) => {
                    let a = a.as_f64().unwrap_or(0.0);
                    let b = b.as_f64().unwrap_or(0.0);
                    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
                }
                (Value::String(a), Value::String(b)) => a.cmp(b),
                _ => Ordering::Equal,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Projection, RowRange};
    use serde_json::json;

    fn backend() -> MemoryBackend {
        MemoryBackend::new()
            .with_table(
                "leads",
                vec![
                    json!({"lead_id": 1, "company_name": "Acme Corp", "score": 40, "assigned_seller": "s1", "crm_enabled": true}),
                    json!({"lead_id": 2, "company_name": "Borealis", "score": 75, "assigned_seller": "s2", "crm_enabled": true}),
                    json!({"lead_id": 3, "company_name": "Cumulus", "score": 10, "assigned_seller": null, "crm_enabled": false}),
                ],
            )
            .with_table(
                "sellers",
                vec![
                    json!({"id": "s1", "name": "Alice"}),
                    json!({"id": "s2", "name": "Bob"}),
                ],
            )
    }

    fn request(table: &str) -> BackendRequest {
        BackendRequest {
            table: table.to_string(),
            projection: Projection {
                base: ColumnSet::All,
                joins: Vec::new(),
            },
            predicates: Vec::new(),
            order: None,
            range: RowRange::new(0, 99),
        }
    }

    #[tokio::test]
    async fn test_unknown_table_is_an_execution_error() {
        let result = backend().query(&request("nope")).await;
        assert!(matches!(result, Err(BackendError::Execution(_))));
    }

    #[tokio::test]
    async fn test_exact_count_ignores_range() {
        let mut req = request("leads");
        req.range = RowRange::new(0, 0);
        let response = backend().query(&req).await.unwrap();
        assert_eq!(response.rows.len(), 1);
        assert_eq!(response.exact_count, 3);
    }

    #[tokio::test]
    async fn test_numeric_comparison_casts_the_literal() {
        let mut req = request("leads");
        req.predicates
            .push(Predicate::new("score", PredicateOp::Gte("40".into())));
        let response = backend().query(&req).await.unwrap();
        assert_eq!(response.exact_count, 2);
    }

    #[tokio::test]
    async fn test_boolean_equality() {
        let mut req = request("leads");
        req.predicates
            .push(Predicate::new("crm_enabled", PredicateOp::Eq("true".into())));
        let response = backend().query(&req).await.unwrap();
        assert_eq!(response.exact_count, 2);
    }

    #[tokio::test]
    async fn test_null_tests() {
        let mut req = request("leads");
        req.predicates
            .push(Predicate::new("assigned_seller", PredicateOp::IsNull));
        let response = backend().query(&req).await.unwrap();
        assert_eq!(response.exact_count, 1);

        let mut req = request("leads");
        req.predicates
            .push(Predicate::new("assigned_seller", PredicateOp::IsNotNull));
        let response = backend().query(&req).await.unwrap();
        assert_eq!(response.exact_count, 2);
    }

    #[tokio::test]
    async fn test_ilike_is_case_insensitive() {
        let mut req = request("leads");
        req.predicates
            .push(Predicate::new("company_name", PredicateOp::ILike("%acme%".into())));
        let response = backend().query(&req).await.unwrap();
        assert_eq!(response.exact_count, 1);

        let mut req = request("leads");
        req.predicates
            .push(Predicate::new("company_name", PredicateOp::Like("%acme%".into())));
        let response = backend().query(&req).await.unwrap();
        assert_eq!(response.exact_count, 0);
    }

    #[tokio::test]
    async fn test_in_membership_over_stringified_cells() {
        let mut req = request("leads");
        req.predicates.push(Predicate::new(
            "lead_id",
            PredicateOp::In(vec!["1".into(), "3".into()]),
        ));
        let response = backend().query(&req).await.unwrap();
        assert_eq!(response.exact_count, 2);
    }

    #[tokio::test]
    async fn test_sort_and_projection() {
        let mut req = request("leads");
        req.projection.base = ColumnSet::Columns(vec!["company_name".into()]);
        req.order = Some(OrderSpec {
            column: "score".into(),
            direction: OrderDirection::Desc,
        });
        let response = backend().query(&req).await.unwrap();
        let names: Vec<_> = response
            .rows
            .iter()
            .map(|row| row.get("company_name").unwrap().as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["Borealis", "Acme Corp", "Cumulus"]);
        assert_eq!(response.rows[0].len(), 1);
    }

    #[tokio::test]
    async fn test_join_embedding() {
        let mut req = request("leads");
        req.projection.joins.push(JoinProjection {
            table: "sellers".into(),
            from_column: "assigned_seller".into(),
            to_column: "id".into(),
            columns: ColumnSet::Columns(vec!["name".into()]),
        });
        let response = backend().query(&req).await.unwrap();

        let first = &response.rows[0];
        assert_eq!(first["sellers"], json!({"name": "Alice"}));
        // Null key embeds as null, not a missing column.
        let third = &response.rows[2];
        assert_eq!(third["sellers"], Value::Null);
    }

    #[tokio::test]
    async fn test_lookup_with_id_restriction_and_order() {
        let req = LookupRequest {
            table: "sellers".into(),
            id_field: "id".into(),
            label_field: "name".into(),
            ids: Some(vec!["s2".into()]),
            order_by_label: false,
        };
        let rows = backend().lookup(&req).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("Bob"));

        let req = LookupRequest {
            table: "sellers".into(),
            id_field: "id".into(),
            label_field: "name".into(),
            ids: None,
            order_by_label: true,
        };
        let rows = backend().lookup(&req).await.unwrap();
        let labels: Vec<_> = rows.iter().map(|r| r["name"].as_str().unwrap()).collect();
        assert_eq!(labels, vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_like_pattern_edges() {
        assert!(matches_like_pattern("Johnson", "%son"));
        assert!(matches_like_pattern("Johnson", "John%"));
        assert!(matches_like_pattern("Johnson", "%ohns%"));
        assert!(!matches_like_pattern("Smith", "%son"));
        assert!(matches_like_pattern("exact", "exact"));
        assert!(!matches_like_pattern("exact", "exac"));
    }
}
