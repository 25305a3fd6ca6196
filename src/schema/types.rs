//! # Schema Registry Types
//!
//! Value types describing what the registry knows about the explored
//! database: joinable foreign keys, label lookup sources, permanent
//! per-table filters, and column metadata.

use serde::{Deserialize, Serialize};

/// Metadata for one column of the currently selected table.
///
/// Drives which filter operators are offered and whether the value input
/// is a plain text field or a lookup-backed choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub data_type: String,
    pub format: String,
}

impl ColumnMeta {
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            format: format.into(),
        }
    }
}

/// A known joinable foreign key on a table.
///
/// The registry offers these as the only joins available to the user; the
/// list is a fixed allow-list, never introspected from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyRef {
    /// Column on the owning table holding the key
    pub column: String,
    /// Table the key points at
    pub foreign_table: String,
    /// Column on the foreign table the key matches
    pub foreign_column: String,
}

impl ForeignKeyRef {
    pub fn new(
        column: impl Into<String>,
        foreign_table: impl Into<String>,
        foreign_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            foreign_table: foreign_table.into(),
            foreign_column: foreign_column.into(),
        }
    }
}

/// Where an identifier column's human-readable label lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupSpec {
    /// Table holding the id/label pairs
    pub lookup_table: String,
    /// Column of that table used as the display label
    pub label_field: String,
}

impl LookupSpec {
    pub fn new(lookup_table: impl Into<String>, label_field: impl Into<String>) -> Self {
        Self {
            lookup_table: lookup_table.into(),
            label_field: label_field.into(),
        }
    }
}

/// A permanent equality predicate applied to every query against a table.
///
/// Not user-editable and never shown in the filter list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandatoryFilter {
    pub column: String,
    /// Literal comparison value; the backend performs any casting
    pub value: String,
}

impl MandatoryFilter {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// An id/label pair offered as a filter value choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupOption {
    pub id: String,
    pub label: String,
}

impl LookupOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}
