//! In-memory cache for parsed expectations.
//!
//! Uses moka's concurrent cache implementation.

use moka::sync::Cache;

/// Thread-safe in-memory cache with configurable capacity.
///
/// The assistant keys parsed measure specs by `pack@version/node`. Stores
/// never replace a published version in place, so an entry cannot go stale.
#[derive(Clone)]
pub struct MemCache<K, V> {
    entries: Cache<K, V>,
}

impl<K, V> MemCache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Allocate a new [`MemCache`].
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Cache::new(capacity as u64),
        }
    }

    /// Cached value for `key`, computing and storing it on a miss.
    pub fn get_or_insert_with(
        &self,
        key: K,
        init: impl FnOnce() -> V,
    ) -> V {
        self.entries.get_with(key, init)
    }
}
