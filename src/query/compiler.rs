//! # Query Compiler
//!
//! Turns a [`QueryState`] into a backend-executable request. Compilation
//! is total: unknown column or operator names pass through untouched and
//! surface as backend execution errors, never compiler errors.

use crate::schema::SchemaRegistry;

use super::operators::FilterOperator;
use super::request::{
    BackendRequest, ColumnSet, JoinProjection, OrderSpec, Predicate, PredicateOp, Projection,
    RowRange,
};
use super::state::{Filter, QueryState};

/// Compile a query description into a backend request.
pub fn compile(state: &QueryState, registry: &SchemaRegistry) -> BackendRequest {
    BackendRequest {
        table: state.table.clone(),
        projection: build_projection(state),
        predicates: build_predicates(state, registry),
        order: build_order(state),
        range: RowRange::for_page(state.page, state.page_size),
    }
}

fn build_projection(state: &QueryState) -> Projection {
    let joins = state
        .joins
        .iter()
        .map(|join| JoinProjection {
            table: join.to_table.clone(),
            from_column: join.from_column.clone(),
            to_column: join.to_column.clone(),
            columns: ColumnSet::from_selection(&join.selected_columns),
        })
        .collect();

    Projection {
        base: ColumnSet::from_selection(&state.selected_columns),
        joins,
    }
}

fn build_predicates(state: &QueryState, registry: &SchemaRegistry) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    // Permanent visibility restrictions go ahead of user filters.
    for mandatory in registry.mandatory_filters_for(&state.table) {
        predicates.push(Predicate::new(
            mandatory.column.clone(),
            PredicateOp::Eq(mandatory.value.clone()),
        ));
    }

    for filter in &state.filters {
        if let Some(predicate) = compile_filter(filter) {
            predicates.push(predicate);
        }
    }

    predicates
}

/// A filter with no target column is skipped, not rejected.
fn compile_filter(filter: &Filter) -> Option<Predicate> {
    if filter.column.is_empty() {
        return None;
    }

    let op = match filter.operator {
        FilterOperator::Eq => PredicateOp::Eq(filter.value.clone()),
        FilterOperator::Neq => PredicateOp::Neq(filter.value.clone()),
        FilterOperator::Gt => PredicateOp::Gt(filter.value.clone()),
        FilterOperator::Gte => PredicateOp::Gte(filter.value.clone()),
        FilterOperator::Lt => PredicateOp::Lt(filter.value.clone()),
        FilterOperator::Lte => PredicateOp::Lte(filter.value.clone()),
        FilterOperator::Like => PredicateOp::Like(format!("%{}%", filter.value)),
        FilterOperator::ILike => PredicateOp::ILike(format!("%{}%", filter.value)),
        FilterOperator::IsNull => PredicateOp::IsNull,
        FilterOperator::IsNotNull => PredicateOp::IsNotNull,
        FilterOperator::In => PredicateOp::In(
            filter
                .value
                .split(',')
                .map(|token| token.trim().to_string())
                .collect(),
        ),
    };

    Some(Predicate::new(filter.column.clone(), op))
}

fn build_order(state: &QueryState) -> Option<OrderSpec> {
    if state.order_by.is_empty() {
        return None;
    }
    Some(OrderSpec {
        column: state.order_by.clone(),
        direction: state.order_direction,
    })
}
