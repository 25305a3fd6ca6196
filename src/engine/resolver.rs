//! # Foreign Key Resolution
//!
//! Post-processes result rows, replacing identifier values with labels
//! from the registered lookup source. Cache-backed and batched: only
//! identifiers not yet cached are fetched, in one lookup per column.
//! Misses leave the raw value in place; resolution never drops a cell.

use std::collections::HashSet;

use serde_json::Value;
use tracing::warn;

use crate::backend::{scalar_to_string, DataBackend, LookupRequest, Row};
use crate::schema::{LookupSpec, SchemaRegistry};

use super::cache::LookupCache;
use super::LOOKUP_ID_FIELD;

/// Replace identifier cells with display labels, row-count and
/// column-set preserving. Idempotent: already-substituted labels have no
/// cache entry and pass through unchanged.
pub(crate) async fn resolve_fk_labels<B: DataBackend>(
    backend: &B,
    registry: &SchemaRegistry,
    cache: &LookupCache,
    mut rows: Vec<Row>,
    table: &str,
) -> Vec<Row> {
    let Some(lookups) = registry.lookups_for_table(table) else {
        return rows;
    };
    if rows.is_empty() || lookups.is_empty() {
        return rows;
    }

    // Only columns present in the actual row shape get resolved; one
    // representative row is enough since all rows share a projection.
    let mut columns: Vec<(&String, &LookupSpec)> = lookups
        .iter()
        .filter(|(column, _)| rows[0].contains_key(*column))
        .collect();
    columns.sort_by(|a, b| a.0.cmp(b.0));

    for (column, spec) in columns {
        let cache_key = format!("{}.{}", spec.lookup_table, spec.label_field);

        // Distinct non-empty identifiers, first-seen order.
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for row in &rows {
            if let Some(Value::String(id)) = row.get(column) {
                if !id.is_empty() && seen.insert(id.clone()) {
                    ids.push(id.clone());
                }
            }
        }
        if ids.is_empty() {
            continue;
        }

        let missing = cache.missing_ids(&cache_key, &ids);
        if !missing.is_empty() {
            let request = LookupRequest {
                table: spec.lookup_table.clone(),
                id_field: LOOKUP_ID_FIELD.to_string(),
                label_field: spec.label_field.clone(),
                ids: Some(missing),
                order_by_label: false,
            };
            match backend.lookup(&request).await {
                Ok(found) => {
                    let entries = found.iter().filter_map(|row| {
                        let id = scalar_to_string(row.get(LOOKUP_ID_FIELD)?)?;
                        let label = row
                            .get(&spec.label_field)
                            .and_then(scalar_to_string)
                            .unwrap_or_default();
                        Some((id, label))
                    });
                    cache.store_labels(&cache_key, entries);
                }
                Err(error) => {
                    warn!(%error, lookup_table = %spec.lookup_table, "label lookup failed, keeping raw identifiers");
                    continue;
                }
            }
        }

        let labels = cache.labels_for(&cache_key);
        for row in &mut rows {
            let Some(Value::String(id)) = row.get(column) else {
                continue;
            };
            // Lookup misses and empty labels keep the raw identifier.
            if let Some(label) = labels.get(id) {
                if !label.is_empty() {
                    row.insert(column.clone(), Value::String(label.clone()));
                }
            }
        }
    }

    rows
}
