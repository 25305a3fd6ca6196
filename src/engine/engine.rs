//! # Query Engine
//!
//! Orchestrates the query lifecycle: compile the user's query state,
//! execute it against the backend, post-process identifier columns into
//! labels, and expose interactive pagination plus bulk export over the
//! same compiled query. Every path returns a structured result; errors
//! never cross this boundary as `Err` or panics.

use std::time::Instant;

use serde::Serialize;
use tracing::debug;

use crate::backend::{scalar_to_string, DataBackend, LookupRequest, Row};
use crate::query::{compile, QueryState};
use crate::schema::{ColumnMeta, LookupOption, SchemaRegistry};

use super::cache::LookupCache;
use super::export::ProgressFn;
use super::{columns, export, resolver, LOOKUP_ID_FIELD};

/// Uniform result envelope for every query path.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub data: Vec<Row>,
    /// Exact matching-row count for interactive queries; retrieved-row
    /// count for exports
    pub count: u64,
    pub error: Option<String>,
    /// Wall-clock duration of the call, in milliseconds
    pub execution_time_ms: f64,
}

impl QueryResult {
    fn finished(started: Instant) -> Self {
        Self {
            execution_time_ms: elapsed_ms(started),
            ..Self::default()
        }
    }

    fn failed(message: String, started: Instant) -> Self {
        Self {
            error: Some(message),
            ..Self::finished(started)
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// The read-only exploration engine over one data backend.
pub struct QueryEngine<B> {
    backend: B,
    registry: SchemaRegistry,
    cache: LookupCache,
}

impl<B: DataBackend> QueryEngine<B> {
    /// Engine over `backend` with the built-in schema registry.
    pub fn new(backend: B) -> Self {
        Self::with_registry(backend, SchemaRegistry::builtin())
    }

    /// Engine over `backend` with a custom registry.
    pub fn with_registry(backend: B, registry: SchemaRegistry) -> Self {
        Self {
            backend,
            registry,
            cache: LookupCache::new(),
        }
    }

    /// Swap in a pre-built cache, e.g. one scoped per request.
    pub fn with_cache(mut self, cache: LookupCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    /// Run one interactive page of the query.
    ///
    /// `count` is the exact matching-row total ignoring pagination, so
    /// the caller can render page controls.
    pub async fn execute_query(&self, state: &QueryState) -> QueryResult {
        let started = Instant::now();

        // An empty table means "no query yet".
        if state.table.is_empty() {
            return QueryResult::finished(started);
        }

        let request = compile(state, &self.registry);
        match self.backend.query(&request).await {
            Err(error) => {
                debug!(%error, table = %state.table, "query failed");
                QueryResult::failed(error.to_string(), started)
            }
            Ok(response) => {
                let data = resolver::resolve_fk_labels(
                    &self.backend,
                    &self.registry,
                    &self.cache,
                    response.rows,
                    &state.table,
                )
                .await;
                debug!(
                    rows = data.len(),
                    total = response.exact_count,
                    table = %state.table,
                    "query complete"
                );
                QueryResult {
                    data,
                    count: response.exact_count,
                    error: None,
                    execution_time_ms: elapsed_ms(started),
                }
            }
        }
    }

    /// Retrieve the full result set for download, up to the export cap.
    pub async fn fetch_all_for_export(
        &self,
        state: &QueryState,
        on_progress: Option<ProgressFn<'_>>,
    ) -> QueryResult {
        export::fetch_all_for_export(&self.backend, &self.registry, &self.cache, state, on_progress)
            .await
    }

    /// Column metadata for a table, catalog-first with sampling fallback.
    pub async fn fetch_table_columns(&self, table: &str) -> Vec<ColumnMeta> {
        columns::fetch_table_columns(&self.backend, table).await
    }

    /// Choice-list entries for an FK-backed filter value. Cache-first;
    /// columns without a declared lookup yield an empty list, as does a
    /// failed fetch.
    pub async fn fetch_lookup_options(&self, table: &str, column: &str) -> Vec<LookupOption> {
        let cache_key = format!("{table}.{column}");
        if let Some(options) = self.cache.cached_options(&cache_key) {
            return options;
        }

        let Some(spec) = self.registry.lookup_for(table, column) else {
            return Vec::new();
        };

        let request = LookupRequest {
            table: spec.lookup_table.clone(),
            id_field: LOOKUP_ID_FIELD.to_string(),
            label_field: spec.label_field.clone(),
            ids: None,
            order_by_label: true,
        };
        let rows = match self.backend.lookup(&request).await {
            Ok(rows) => rows,
            Err(error) => {
                tracing::warn!(%error, table, column, "lookup options fetch failed");
                return Vec::new();
            }
        };

        let options: Vec<LookupOption> = rows
            .iter()
            .filter_map(|row| {
                let id = scalar_to_string(row.get(LOOKUP_ID_FIELD)?)?;
                let label = row
                    .get(&spec.label_field)
                    .and_then(scalar_to_string)
                    .unwrap_or_default();
                Some(LookupOption::new(id, label))
            })
            .collect();

        self.cache.store_options(&cache_key, options.clone());
        options
    }

    /// Whether a column's filter value should offer a choice list.
    pub fn has_lookup(&self, table: &str, column: &str) -> bool {
        self.registry.has_lookup(table, column)
    }
}
