//! # Schema Registry
//!
//! Static knowledge about the explored database: domain grouping of
//! tables, the allow-list of joinable foreign keys, which identifier
//! columns resolve to display labels, and permanent per-table visibility
//! filters. Read-only after construction.

use std::collections::HashMap;

use super::types::{ForeignKeyRef, LookupSpec, MandatoryFilter};

/// Group label for tables not claimed by any declared group.
pub const UNGROUPED_LABEL: &str = "Other";

/// Registry of static schema knowledge.
///
/// Built once and passed by reference into the compiler and engine. The
/// built-in data set lives in [`SchemaRegistry::builtin`]; tests and
/// other deployments assemble their own with the `with_*` builders.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    /// Business groups in declaration order
    groups: Vec<(String, Vec<String>)>,
    /// Table name to its joinable foreign keys
    joins: HashMap<String, Vec<ForeignKeyRef>>,
    /// Table name to column name to label source
    lookups: HashMap<String, HashMap<String, LookupSpec>>,
    /// Table name to always-applied predicates
    mandatory_filters: HashMap<String, Vec<MandatoryFilter>>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a business group and the tables it contains.
    pub fn with_group(
        mut self,
        label: impl Into<String>,
        tables: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.groups.push((
            label.into(),
            tables.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Declare a joinable foreign key on a table.
    pub fn with_join(mut self, table: impl Into<String>, foreign_key: ForeignKeyRef) -> Self {
        self.joins.entry(table.into()).or_default().push(foreign_key);
        self
    }

    /// Declare a label lookup source for an identifier column.
    pub fn with_lookup(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        spec: LookupSpec,
    ) -> Self {
        self.lookups
            .entry(table.into())
            .or_default()
            .insert(column.into(), spec);
        self
    }

    /// Declare a permanent equality predicate for a table.
    pub fn with_mandatory_filter(
        mut self,
        table: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.mandatory_filters
            .entry(table.into())
            .or_default()
            .push(MandatoryFilter::new(column, value));
        self
    }

    /// Tables by business group, in declaration order.
    pub fn grouped_tables(&self) -> &[(String, Vec<String>)] {
        &self.groups
    }

    /// The group a table belongs to. Tables in no group land in "Other".
    pub fn group_for_table(&self, table: &str) -> &str {
        for (label, tables) in &self.groups {
            if tables.iter().any(|t| t == table) {
                return label;
            }
        }
        UNGROUPED_LABEL
    }

    /// The joins offered for a table.
    pub fn joins_for_table(&self, table: &str) -> &[ForeignKeyRef] {
        self.joins.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Label source for one identifier column, if declared.
    pub fn lookup_for(&self, table: &str, column: &str) -> Option<&LookupSpec> {
        self.lookups.get(table)?.get(column)
    }

    /// All declared label sources for a table.
    pub fn lookups_for_table(&self, table: &str) -> Option<&HashMap<String, LookupSpec>> {
        self.lookups.get(table)
    }

    /// Whether a column has a declared label source.
    pub fn has_lookup(&self, table: &str, column: &str) -> bool {
        self.lookup_for(table, column).is_some()
    }

    /// Predicates always applied to queries against a table.
    pub fn mandatory_filters_for(&self, table: &str) -> &[MandatoryFilter] {
        self.mandatory_filters
            .get(table)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
