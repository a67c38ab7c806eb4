#[cfg(test)]
mod tests;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

///
/// RecordCache
///
/// Bounded, cost-aware read cache keyed by record id.
///
/// Entries are evicted least-recently-used first until the total cost fits the
/// capacity. An entry costlier than the whole capacity is never cached, and a
/// capacity of zero disables caching entirely. Entries are best-effort: a miss
/// says nothing about whether the record exists.
///

pub struct RecordCache<T> {
    capacity: u64,
    inner: Mutex<CacheInner<T>>,
}

struct CacheInner<T> {
    entries: LruCache<String, CacheEntry<T>>,
    cost: u64,
}

struct CacheEntry<T> {
    value: T,
    cost: u64,
}

impl<T: Clone> RecordCache<T> {
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner {
                entries: LruCache::unbounded(),
                cost: 0,
            }),
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Clone of the cached value, marking it most recently used.
    pub fn get(&self, id: &str) -> Option<T> {
        self.inner
            .lock()
            .entries
            .get(id)
            .map(|entry| entry.value.clone())
    }

    /// Cache `value` under `id`; returns whether it was admitted.
    pub fn insert(&self, id: &str, value: T, cost: u64) -> bool {
        let mut inner = self.inner.lock();

        if let Some(previous) = inner.entries.pop(id) {
            inner.cost -= previous.cost;
        }

        if cost > self.capacity {
            return false;
        }

        while inner.cost + cost > self.capacity {
            let Some((evicted, entry)) = inner.entries.pop_lru() else {
                break;
            };
            inner.cost -= entry.cost;
            debug!(id = %evicted, "cache eviction");
        }

        inner.entries.put(id.to_string(), CacheEntry { value, cost });
        inner.cost += cost;

        true
    }

    pub fn remove(&self, id: &str) -> Option<T> {
        let mut inner = self.inner.lock();
        let entry = inner.entries.pop(id)?;
        inner.cost -= entry.cost;

        Some(entry.value)
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.cost = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total cost of the cached entries.
    #[must_use]
    pub fn cost(&self) -> u64 {
        self.inner.lock().cost
    }
}
