//! Bounded key/value cache with per-entry time-to-live
//!
//! Expiry is lazy: a read that finds a stale entry removes it and reports a
//! miss. When the cache is full, inserting a new key evicts the oldest
//! inserted entry first. Overwriting an existing key keeps its position.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// A stored value and the moment it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) >= ttl
    }
}

struct Slots<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Keys in insertion order, oldest first
    order: VecDeque<K>,
}

impl<K: Eq + Hash, V> Slots<K, V> {
    fn remove(&mut self, key: &K) -> Option<CacheEntry<V>> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.order.retain(|k| k != key);
        }
        removed
    }
}

/// Time-expiring cache shared across concurrent handlers
pub struct ExpiringCache<K, V> {
    slots: Mutex<Slots<K, V>>,
    ttl: Duration,
    capacity: usize,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty cache
    ///
    /// A capacity of zero is treated as one.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            slots: Mutex::new(Slots {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            ttl,
            capacity: capacity.max(1),
        }
    }

    fn slots(&self) -> MutexGuard<'_, Slots<K, V>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read a fresh value, dropping it if it has expired
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut slots = self.slots();

        let expired = match slots.entries.get(key) {
            None => return None,
            Some(entry) => entry.is_expired(self.ttl, now),
        };

        if expired {
            slots.remove(key);
            trace!("Dropped expired cache entry");
            return None;
        }

        slots.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store a value, evicting the oldest inserted entry if full
    pub fn set(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        let mut slots = self.slots();

        if let Some(existing) = slots.entries.get_mut(&key) {
            *existing = entry;
            return;
        }

        if slots.entries.len() >= self.capacity {
            if let Some(oldest) = slots.order.pop_front() {
                slots.entries.remove(&oldest);
                trace!("Evicted oldest cache entry");
            }
        }

        slots.order.push_back(key.clone());
        slots.entries.insert(key, entry);
    }

    /// Remove every entry
    pub fn clear(&self) {
        let mut slots = self.slots();
        slots.entries.clear();
        slots.order.clear();
    }

    /// Drop all expired entries, returning how many were removed
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut slots = self.slots();
        let ttl = self.ttl;

        let stale: Vec<K> = slots
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl, now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            slots.remove(key);
        }
        stale.len()
    }

    /// Number of physically present entries, including unswept stale ones
    pub fn len(&self) -> usize {
        self.slots().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THIRTY_MINUTES: Duration = Duration::from_secs(30 * 60);

    #[tokio::test(start_paused = true)]
    async fn evicts_oldest_inserted_when_full() {
        let cache = ExpiringCache::new(THIRTY_MINUTES, 2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("c", 3);

        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn value_visible_until_ttl_elapses() {
        let cache = ExpiringCache::new(THIRTY_MINUTES, 10);
        cache.set("surah_index", vec![1, 2, 3]);

        tokio::time::advance(THIRTY_MINUTES - Duration::from_secs(1)).await;
        assert_eq!(cache.get(&"surah_index"), Some(vec![1, 2, 3]));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get(&"surah_index"), None);
        assert!(cache.is_empty(), "expired read should remove the entry");
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_does_not_evict() {
        let cache = ExpiringCache::new(THIRTY_MINUTES, 2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(10));
        assert_eq!(cache.get(&"b"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_keeps_insertion_position() {
        let cache = ExpiringCache::new(THIRTY_MINUTES, 2);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.set("a", 10);
        cache.set("c", 3);

        assert_eq!(cache.get(&"a"), None);
        assert_eq!(cache.get(&"b"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_refreshes_lifetime() {
        let cache = ExpiringCache::new(Duration::from_secs(60), 4);
        cache.set(7u32, "old");
        tokio::time::advance(Duration::from_secs(50)).await;
        cache.set(7u32, "new");
        tokio::time::advance(Duration::from_secs(50)).await;

        assert_eq!(cache.get(&7), Some("new"));
    }

    #[tokio::test(start_paused = true)]
    async fn size_never_exceeds_capacity() {
        let cache = ExpiringCache::new(THIRTY_MINUTES, 5);
        for i in 0..50u32 {
            cache.set(i, i * 2);
            assert!(cache.len() <= 5);
        }
        // The five most recent insertions survive
        for i in 45..50u32 {
            assert_eq!(cache.get(&i), Some(i * 2));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn lazily_expired_keys_leave_eviction_order() {
        let cache = ExpiringCache::new(Duration::from_secs(10), 2);
        cache.set("a", 1);
        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.get(&"a"), None);

        cache.set("b", 2);
        cache.set("c", 3);
        assert_eq!(cache.get(&"b"), Some(2));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_removes_only_stale_entries() {
        let cache = ExpiringCache::new(Duration::from_secs(10), 10);
        cache.set("old", 1);
        tokio::time::advance(Duration::from_secs(8)).await;
        cache.set("fresh", 2);
        tokio::time::advance(Duration::from_secs(3)).await;

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&"fresh"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn clear_empties_cache() {
        let cache = ExpiringCache::new(THIRTY_MINUTES, 3);
        cache.set(1, "x");
        cache.set(2, "y");
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
    }
}
