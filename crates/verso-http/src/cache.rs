//! Process-wide metadata cache
//!
//! Collation and per-route aggregation are pure, so their results are
//! computed once per key and shared. Values are computed without holding any
//! lock; when two threads race, the first insert wins and the other value is
//! dropped.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use verso_core::{collate, trace_trace, CollatedController, ControllerDeclaration};

/// Concurrent insert-if-absent cache.
#[derive(Debug)]
pub struct MetadataCache<K: Eq + Hash, V> {
    entries: DashMap<K, Arc<V>>,
}

impl<K: Eq + Hash, V> Default for MetadataCache<K, V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V> MetadataCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// The cached value for `key`, computing it on a miss.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> Arc<V> {
        if let Some(existing) = self.get(&key) {
            return existing;
        }

        let value = Arc::new(compute());
        match self.entries.entry(key) {
            Entry::Occupied(entry) => {
                trace_trace!("Metadata cache race lost; keeping first value");
                Arc::clone(entry.get())
            }
            Entry::Vacant(entry) => Arc::clone(entry.insert(value).value()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Collated controllers keyed by a host-chosen route or group key.
pub type CollationCache = MetadataCache<String, Vec<CollatedController>>;

impl CollationCache {
    /// Collate `controllers` once per `key`.
    pub fn collated(
        &self,
        key: impl Into<String>,
        controllers: &[ControllerDeclaration],
    ) -> Arc<Vec<CollatedController>> {
        self.get_or_compute(key.into(), || collate(controllers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use verso_core::{ActionDeclaration, ApiVersion, ApiVersionModel};

    #[test]
    fn test_computes_once() {
        let cache: MetadataCache<&str, usize> = MetadataCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache.get_or_compute("key", || {
                calls.fetch_add(1, Ordering::SeqCst);
                42
            });
            assert_eq!(*value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_first_insert_wins_under_contention() {
        let cache: Arc<MetadataCache<u32, usize>> = Arc::new(MetadataCache::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || *cache.get_or_compute(1, || i))
            })
            .collect();
        let results: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let first = results[0];
        assert!(results.iter().all(|r| *r == first));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_collation_cache() {
        let cache = CollationCache::new();
        let controllers = [ControllerDeclaration::new(
            "Orders",
            ApiVersionModel::from_version(ApiVersion::new(1, 0)),
        )
        .action(ActionDeclaration::new("Get", ApiVersionModel::empty()))];

        let first = cache.collated("orders", &controllers);
        let second = cache.collated("orders", &[]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first[0].actions.len(), 1);
    }
}
