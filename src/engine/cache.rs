//! # Session Caches
//!
//! Lookup results cached for the lifetime of the cache object, never
//! evicted. The cache is an explicit value owned by the engine, so its
//! lifetime is the embedder's choice: per request, per session, or per
//! process are all valid configurations. Staleness is accepted until
//! [`LookupCache::clear`] is called.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::schema::LookupOption;

/// Caches for lookup-backed choice lists and id-to-label resolution.
///
/// Writes are synchronized, so sharing one cache across concurrent query
/// flows is sound.
#[derive(Debug, Default)]
pub struct LookupCache {
    /// `table.column` to the full, sorted option list
    options: Mutex<HashMap<String, Vec<LookupOption>>>,
    /// `lookup_table.label_field` to id-to-label entries
    labels: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached choice list, if this key was fetched before.
    pub fn cached_options(&self, key: &str) -> Option<Vec<LookupOption>> {
        self.options.lock().unwrap().get(key).cloned()
    }

    /// Store the full choice list for a key.
    pub fn store_options(&self, key: &str, options: Vec<LookupOption>) {
        self.options.lock().unwrap().insert(key.to_string(), options);
    }

    /// The subset of `ids` with no cached label yet, order preserved.
    pub fn missing_ids(&self, key: &str, ids: &[String]) -> Vec<String> {
        let labels = self.labels.lock().unwrap();
        match labels.get(key) {
            None => ids.to_vec(),
            Some(known) => ids
                .iter()
                .filter(|id| !known.contains_key(*id))
                .cloned()
                .collect(),
        }
    }

    /// Merge freshly fetched labels into the cache.
    pub fn store_labels(&self, key: &str, entries: impl IntoIterator<Item = (String, String)>) {
        let mut labels = self.labels.lock().unwrap();
        labels.entry(key.to_string()).or_default().extend(entries);
    }

    /// Snapshot of all labels known for a key.
    pub fn labels_for(&self, key: &str) -> HashMap<String, String> {
        self.labels
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop everything. The only invalidation this cache supports.
    pub fn clear(&self) {
        self.options.lock().unwrap().clear();
        self.labels.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_round_trip() {
        let cache = LookupCache::new();
        assert!(cache.cached_options("leads.stage").is_none());

        cache.store_options("leads.stage", vec![LookupOption::new("1", "New")]);
        let options = cache.cached_options("leads.stage").unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "New");
    }

    #[test]
    fn test_missing_ids_before_and_after_store() {
        let cache = LookupCache::new();
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        assert_eq!(cache.missing_ids("sellers.name", &ids), ids);

        cache.store_labels(
            "sellers.name",
            [("a".to_string(), "Alice".to_string()), ("c".to_string(), "Carol".to_string())],
        );
        assert_eq!(cache.missing_ids("sellers.name", &ids), vec!["b".to_string()]);
    }

    #[test]
    fn test_store_labels_merges() {
        let cache = LookupCache::new();
        cache.store_labels("sellers.name", [("a".to_string(), "Alice".to_string())]);
        cache.store_labels("sellers.name", [("b".to_string(), "Bob".to_string())]);

        let labels = cache.labels_for("sellers.name");
        assert_eq!(labels.len(), 2);
        assert_eq!(labels["a"], "Alice");
        assert_eq!(labels["b"], "Bob");
    }

    #[test]
    fn test_clear_drops_both_sides() {
        let cache = LookupCache::new();
        cache.store_options("leads.stage", vec![LookupOption::new("1", "New")]);
        cache.store_labels("sellers.name", [("a".to_string(), "Alice".to_string())]);

        cache.clear();

        assert!(cache.cached_options("leads.stage").is_none());
        assert!(cache.labels_for("sellers.name").is_empty());
    }
}
