//! # Filter Operator Catalog
//!
//! The fixed comparison vocabulary for user filters, and the mapping from
//! a column's declared data type to the operators legal for it.

use serde::{Deserialize, Serialize};

/// Comparison operators available to filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Equals
    #[serde(rename = "eq")]
    Eq,

    /// Not equals
    #[serde(rename = "neq")]
    Neq,

    /// Greater than
    #[serde(rename = "gt")]
    Gt,

    /// Greater than or equal
    #[serde(rename = "gte")]
    Gte,

    /// Less than
    #[serde(rename = "lt")]
    Lt,

    /// Less than or equal
    #[serde(rename = "lte")]
    Lte,

    /// Substring containment, case-sensitive
    #[serde(rename = "like")]
    Like,

    /// Substring containment, case-insensitive
    #[serde(rename = "ilike")]
    ILike,

    /// Null test
    #[serde(rename = "is_null")]
    IsNull,

    /// Negated null test
    #[serde(rename = "is_not_null")]
    IsNotNull,

    /// Membership in a comma-separated literal list
    #[serde(rename = "in")]
    In,
}

impl FilterOperator {
    /// Get the operator string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Neq => "neq",
            FilterOperator::Gt => "gt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
            FilterOperator::Lte => "lte",
            FilterOperator::Like => "like",
            FilterOperator::ILike => "ilike",
            FilterOperator::IsNull => "is_null",
            FilterOperator::IsNotNull => "is_not_null",
            FilterOperator::In => "in",
        }
    }

    /// Human-readable label shown in the operator picker.
    pub fn label(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Neq => "!=",
            FilterOperator::Gt => ">",
            FilterOperator::Gte => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Lte => "<=",
            FilterOperator::Like => "Contains",
            FilterOperator::ILike => "Contains (any case)",
            FilterOperator::IsNull => "Is empty",
            FilterOperator::IsNotNull => "Is not empty",
            FilterOperator::In => "In list",
        }
    }

    /// Null tests take no comparison value.
    pub fn needs_value(&self) -> bool {
        !matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }
}

use FilterOperator::*;

const TEXT_OPERATORS: &[FilterOperator] = &[Eq, Neq, Like, ILike, IsNull, IsNotNull, In];
const NUMBER_OPERATORS: &[FilterOperator] = &[Eq, Neq, Gt, Gte, Lt, Lte, IsNull, IsNotNull];
const DATE_OPERATORS: &[FilterOperator] = &[Eq, Neq, Gt, Gte, Lt, Lte, IsNull, IsNotNull];
const BOOLEAN_OPERATORS: &[FilterOperator] = &[Eq, IsNull, IsNotNull];
const UUID_OPERATORS: &[FilterOperator] = &[Eq, Neq, IsNull, IsNotNull];
const DEFAULT_OPERATORS: &[FilterOperator] = &[Eq, Neq, Like, ILike, IsNull, IsNotNull];

/// Legal operators for a column's declared data type.
///
/// Matching is on type-name fragments so backend-specific spellings
/// (`int8`, `bigint`, `character varying`, ...) land in the right family.
pub fn operators_for_type(data_type: &str) -> &'static [FilterOperator] {
    if data_type.contains("int")
        || data_type.contains("numeric")
        || data_type.contains("float")
        || data_type.contains("decimal")
    {
        return NUMBER_OPERATORS;
    }
    if data_type.contains("timestamp") || data_type.contains("date") {
        return DATE_OPERATORS;
    }
    if data_type == "boolean" {
        return BOOLEAN_OPERATORS;
    }
    if data_type == "uuid" {
        return UUID_OPERATORS;
    }
    if data_type == "text" || data_type.contains("char") {
        return TEXT_OPERATORS;
    }
    DEFAULT_OPERATORS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_types_get_range_operators() {
        for data_type in ["integer", "bigint", "smallint", "numeric", "float8", "decimal"] {
            let ops = operators_for_type(data_type);
            assert!(ops.contains(&FilterOperator::Gt), "{data_type}");
            assert!(!ops.contains(&FilterOperator::Like), "{data_type}");
        }
    }

    #[test]
    fn test_text_types_get_pattern_operators() {
        for data_type in ["text", "varchar", "character varying"] {
            let ops = operators_for_type(data_type);
            assert!(ops.contains(&FilterOperator::ILike), "{data_type}");
            assert!(ops.contains(&FilterOperator::In), "{data_type}");
        }
    }

    #[test]
    fn test_timestamp_is_a_date_type() {
        let ops = operators_for_type("timestamp with time zone");
        assert!(ops.contains(&FilterOperator::Lte));
        assert!(!ops.contains(&FilterOperator::In));
    }

    #[test]
    fn test_boolean_and_uuid_are_narrow() {
        assert_eq!(operators_for_type("boolean").len(), 3);
        let uuid_ops = operators_for_type("uuid");
        assert!(uuid_ops.contains(&FilterOperator::Neq));
        assert!(!uuid_ops.contains(&FilterOperator::Gt));
    }

    #[test]
    fn test_unknown_type_gets_default_set() {
        assert_eq!(operators_for_type("jsonb"), DEFAULT_OPERATORS);
    }

    #[test]
    fn test_null_tests_need_no_value() {
        assert!(!FilterOperator::IsNull.needs_value());
        assert!(!FilterOperator::IsNotNull.needs_value());
        assert!(FilterOperator::Eq.needs_value());
        assert!(FilterOperator::In.needs_value());
    }

    #[test]
    fn test_operator_serde_names() {
        let json = serde_json::to_string(&FilterOperator::IsNotNull).unwrap();
        assert_eq!(json, "\"is_not_null\"");
        let op: FilterOperator = serde_json::from_str("\"ilike\"").unwrap();
        assert_eq!(op, FilterOperator::ILike);
    }
}
