//! # Bulk Export
//!
//! Full-result retrieval for download: sequential range sweeps over the
//! compiled query with adaptive page sizing under backend timeouts, plus
//! flattening and CSV rendering of the gathered rows.

use std::collections::HashSet;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info};

use crate::backend::{DataBackend, Row};
use crate::query::{compile, QueryState, RowRange};
use crate::schema::SchemaRegistry;

use super::cache::LookupCache;
use super::engine::QueryResult;
use super::resolver::resolve_fk_labels;

/// Hard cap on exported rows.
pub const MAX_EXPORT_ROWS: usize = 10_000;

/// Initial rows-per-request window.
pub const EXPORT_PAGE_SIZE: u64 = 500;

/// Smallest window the timeout backoff will try.
pub const MIN_EXPORT_PAGE_SIZE: u64 = 50;

/// Progress callback, invoked with the cumulative row count after each
/// successful page.
pub type ProgressFn<'a> = &'a mut dyn FnMut(usize);

/// Sweep the full result set, up to the export cap.
///
/// Pages are fetched strictly sequentially: end-of-data detection needs
/// the prior page's length, and window shrinking must apply before the
/// next request. A timeout halves the window and retries the same
/// offset; any other error stops the sweep with the rows gathered so
/// far.
pub(crate) async fn fetch_all_for_export<B: DataBackend>(
    backend: &B,
    registry: &SchemaRegistry,
    cache: &LookupCache,
    state: &QueryState,
    mut on_progress: Option<ProgressFn<'_>>,
) -> QueryResult {
    let started = Instant::now();

    // The interactive window is ignored; ranges are applied per sweep page.
    let base = compile(state, registry);
    let mut page_size = EXPORT_PAGE_SIZE;
    let mut offset: u64 = 0;
    let mut gathered: Vec<Row> = Vec::new();

    while gathered.len() < MAX_EXPORT_ROWS {
        let mut request = base.clone();
        request.range = RowRange::new(offset, offset + page_size - 1);

        match backend.query(&request).await {
            Err(error) if error.is_timeout() && page_size > MIN_EXPORT_PAGE_SIZE => {
                page_size = (page_size / 2).max(MIN_EXPORT_PAGE_SIZE);
                debug!(offset, page_size, "backend timeout, retrying with a smaller window");
            }
            Err(error) => {
                // Best-effort: surface the error with the partial sweep.
                return QueryResult {
                    count: gathered.len() as u64,
                    data: gathered,
                    error: Some(error.to_string()),
                    execution_time_ms: elapsed_ms(started),
                };
            }
            Ok(response) => {
                if response.rows.is_empty() {
                    break;
                }
                let returned = response.rows.len();
                gathered.extend(response.rows);
                if let Some(callback) = on_progress.as_mut() {
                    callback(gathered.len());
                }
                if returned < page_size as usize {
                    break;
                }
                offset += page_size;
            }
        }
    }

    info!(rows = gathered.len(), table = %state.table, "export sweep complete");

    let resolved = resolve_fk_labels(backend, registry, cache, gathered, &state.table).await;
    QueryResult {
        count: resolved.len() as u64,
        data: resolved,
        error: None,
        execution_time_ms: elapsed_ms(started),
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Flatten nested join objects into dotted column names
/// (`sellers.name`). Arrays and scalars pass through unchanged.
pub fn flatten_row(row: &Row) -> Row {
    let mut flat = Row::new();
    flatten_into(&mut flat, row, None);
    flat
}

fn flatten_into(out: &mut Row, row: &Row, prefix: Option<&str>) {
    for (key, value) in row {
        let column = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(out, nested, Some(&column)),
            other => {
                out.insert(column, other.clone());
            }
        }
    }
}

/// Render rows as an RFC 4180 CSV document. The header is the union of
/// flattened column names across all rows; cells missing a column are
/// left empty.
pub fn rows_to_csv(rows: &[Row]) -> String {
    let flat: Vec<Row> = rows.iter().map(flatten_row).collect();

    let mut header: Vec<String> = Vec::new();
    let mut seen = HashSet::new();
    for row in &flat {
        for key in row.keys() {
            if seen.insert(key.clone()) {
                header.push(key.clone());
            }
        }
    }

    let mut csv = String::new();
    csv.push_str(
        &header
            .iter()
            .map(|name| csv_field(Some(&Value::String(name.clone()))))
            .collect::<Vec<_>>()
            .join(","),
    );
    csv.push('\n');

    for row in &flat {
        let line = header
            .iter()
            .map(|column| csv_field(row.get(column)))
            .collect::<Vec<_>>()
            .join(",");
        csv.push_str(&line);
        csv.push('\n');
    }

    csv
}

fn csv_field(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };
    if text.contains(',') || text.contains('"') || text.contains('\n') || text.contains('\r') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

/// Dated default filename for a table export.
pub fn export_filename(table: &str) -> String {
    format!("{}_{}.csv", table, chrono::Local::now().format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("test rows must be objects"),
        }
    }

    #[test]
    fn test_flatten_row_dots_nested_objects() {
        let flat = flatten_row(&row(json!({
            "lead_id": 1,
            "sellers": {"name": "Alice", "team": {"label": "North"}},
            "tags": ["a", "b"],
        })));

        assert_eq!(flat["lead_id"], json!(1));
        assert_eq!(flat["sellers.name"], json!("Alice"));
        assert_eq!(flat["sellers.team.label"], json!("North"));
        assert_eq!(flat["tags"], json!(["a", "b"]));
        assert!(!flat.contains_key("sellers"));
    }

    #[test]
    fn test_csv_escaping() {
        let rows = vec![row(json!({
            "name": "Acme, Inc.",
            "note": "said \"hi\"",
            "score": 7,
        }))];
        let csv = rows_to_csv(&rows);
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "name,note,score");
        assert_eq!(lines.next().unwrap(), "\"Acme, Inc.\",\"said \"\"hi\"\"\",7");
    }

    #[test]
    fn test_csv_ragged_rows_share_a_header() {
        let rows = vec![
            row(json!({"a": 1})),
            row(json!({"a": 2, "b": "x"})),
        ];
        let csv = rows_to_csv(&rows);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "a,b");
        assert_eq!(lines[1], "1,");
        assert_eq!(lines[2], "2,x");
    }

    #[test]
    fn test_export_filename_is_dated() {
        let name = export_filename("leads");
        assert!(name.starts_with("leads_"));
        assert!(name.ends_with(".csv"));
    }
}
