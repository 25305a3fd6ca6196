//! # Column Discovery
//!
//! Best-effort column metadata: ask the backend catalog first, fall back
//! to sampling a single row and inferring types from value shape. Total
//! failure degrades to an empty column list, never an error.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::backend::DataBackend;
use crate::query::{BackendRequest, ColumnSet, Projection, RowRange};
use crate::schema::ColumnMeta;

fn date_prefix() -> &'static Regex {
    static DATE_PREFIX: OnceLock<Regex> = OnceLock::new();
    DATE_PREFIX.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date pattern"))
}

pub(crate) async fn fetch_table_columns<B: DataBackend>(backend: &B, table: &str) -> Vec<ColumnMeta> {
    match backend.fetch_columns_metadata(table).await {
        Ok(descriptors) if !descriptors.is_empty() => {
            return descriptors
                .into_iter()
                .map(|descriptor| {
                    ColumnMeta::new(
                        descriptor.name,
                        descriptor.data_type.clone(),
                        descriptor.data_type,
                    )
                })
                .collect();
        }
        Ok(_) => {}
        Err(error) => {
            debug!(%error, table, "column catalog unavailable, sampling a row");
        }
    }

    match backend.query(&sample_request(table)).await {
        Ok(response) => response
            .rows
            .first()
            .map(|row| {
                row.iter()
                    .map(|(name, value)| {
                        let data_type = infer_data_type(value);
                        ColumnMeta::new(name.clone(), data_type, data_type)
                    })
                    .collect()
            })
            .unwrap_or_default(),
        Err(error) => {
            debug!(%error, table, "column sampling failed");
            Vec::new()
        }
    }
}

fn sample_request(table: &str) -> BackendRequest {
    BackendRequest {
        table: table.to_string(),
        projection: Projection {
            base: ColumnSet::All,
            joins: Vec::new(),
        },
        predicates: Vec::new(),
        order: None,
        range: RowRange::new(0, 0),
    }
}

/// Inference precedence: numeric, boolean, date shape, UUID shape, text.
fn infer_data_type(value: &Value) -> &'static str {
    match value {
        Value::Number(_) => "numeric",
        Value::Bool(_) => "boolean",
        Value::String(text) => {
            if date_prefix().is_match(text) {
                "timestamp with time zone"
            } else if Uuid::parse_str(text).is_ok() {
                "uuid"
            } else {
                "text"
            }
        }
        _ => "text",
    }
}
