//! Least-recently-used cache for binary payloads (page images)
//!
//! Misses are loaded through a caller-supplied loader. Concurrent misses for
//! the same id are serialised on a per-id gate, so the second caller finds
//! the payload the first one stored instead of downloading it again.
//! Failed loads are never cached.

use crate::error::MushafResult;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;
use tracing::debug;

/// Shared, immutable payload handed to every reader
pub type Payload = Arc<[u8]>;

/// A cached payload and its recency
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub id: u32,
    pub payload: Payload,
    pub last_accessed: Instant,
    /// Monotonic access counter, breaks ties between equal timestamps
    tick: u64,
}

impl ResourceEntry {
    fn recency(&self) -> (Instant, u64) {
        (self.last_accessed, self.tick)
    }
}

/// Whether a lookup was served from memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Hit,
    Miss,
}

/// Per-id load gate and the number of callers holding it
struct Gate {
    mutex: Arc<tokio::sync::Mutex<()>>,
    holders: usize,
}

/// One caller's hold on a gate; the last holder to drop removes it
struct GateClaim<'a> {
    gates: &'a Mutex<HashMap<u32, Gate>>,
    id: u32,
    mutex: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for GateClaim<'_> {
    fn drop(&mut self) {
        let mut gates = lock(self.gates);
        if let Some(gate) = gates.get_mut(&self.id) {
            gate.holders = gate.holders.saturating_sub(1);
            if gate.holders == 0 {
                gates.remove(&self.id);
            }
        }
    }
}

/// Count-bounded LRU cache keyed by resource id
pub struct ResourceCache {
    entries: Mutex<HashMap<u32, ResourceEntry>>,
    gates: Mutex<HashMap<u32, Gate>>,
    clock: AtomicU64,
    capacity: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ResourceCache {
    /// Create an empty cache holding at most `capacity` payloads
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            clock: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    fn next_tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    /// Return a cached payload and mark it as most recently used
    pub fn get(&self, id: u32) -> Option<Payload> {
        let tick = self.next_tick();
        let mut entries = lock(&self.entries);
        entries.get_mut(&id).map(|entry| {
            entry.last_accessed = Instant::now();
            entry.tick = tick;
            entry.payload.clone()
        })
    }

    /// Return the cached payload for `id`, loading it on a miss
    pub async fn get_or_load<F, Fut>(&self, id: u32, loader: F) -> MushafResult<Payload>
    where
        F: FnOnce(u32) -> Fut,
        Fut: Future<Output = MushafResult<Vec<u8>>>,
    {
        self.get_or_load_traced(id, loader)
            .await
            .map(|(payload, _)| payload)
    }

    /// Like [`get_or_load`](Self::get_or_load), also reporting hit or miss
    pub async fn get_or_load_traced<F, Fut>(
        &self,
        id: u32,
        loader: F,
    ) -> MushafResult<(Payload, Lookup)>
    where
        F: FnOnce(u32) -> Fut,
        Fut: Future<Output = MushafResult<Vec<u8>>>,
    {
        if let Some(payload) = self.get(id) {
            return Ok((payload, Lookup::Hit));
        }

        // Released on every exit path, including a dropped future
        let claim = self.claim(id);
        let _permit = claim.mutex.lock().await;

        // Another caller may have finished loading while we waited
        if let Some(payload) = self.get(id) {
            return Ok((payload, Lookup::Hit));
        }

        let result = loader(id).await.map(Payload::from);
        if let Ok(payload) = &result {
            self.insert(id, payload.clone());
        }

        result.map(|payload| (payload, Lookup::Miss))
    }

    fn claim(&self, id: u32) -> GateClaim<'_> {
        let mut gates = lock(&self.gates);
        let gate = gates.entry(id).or_insert_with(|| Gate {
            mutex: Arc::default(),
            holders: 0,
        });
        gate.holders += 1;
        GateClaim {
            gates: &self.gates,
            id,
            mutex: gate.mutex.clone(),
        }
    }

    /// Ids with a load in flight or queued
    #[cfg(test)]
    fn pending_gates(&self) -> usize {
        lock(&self.gates).len()
    }

    fn insert(&self, id: u32, payload: Payload) {
        let entry = ResourceEntry {
            id,
            payload,
            last_accessed: Instant::now(),
            tick: self.next_tick(),
        };

        let mut entries = lock(&self.entries);
        entries.insert(id, entry);

        while entries.len() > self.capacity {
            let victim = entries
                .values()
                .min_by_key(|entry| entry.recency())
                .map(|entry| entry.id);
            match victim {
                Some(victim) => {
                    entries.remove(&victim);
                    debug!("Evicted resource {} from image cache", victim);
                }
                None => break,
            }
        }
    }

    pub fn contains(&self, id: u32) -> bool {
        lock(&self.entries).contains_key(&id)
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        lock(&self.entries).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MushafError;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn page_bytes(id: u32) -> Vec<u8> {
        format!("page-{id}").into_bytes()
    }

    async fn load(cache: &ResourceCache, id: u32) -> Payload {
        cache
            .get_or_load(id, |id| async move { Ok(page_bytes(id)) })
            .await
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn hit_skips_loader() {
        let cache = ResourceCache::new(4);
        load(&cache, 1).await;

        let calls = AtomicUsize::new(0);
        let (payload, lookup) = cache
            .get_or_load_traced(1, |id| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok(page_bytes(id)) }
            })
            .await
            .unwrap();

        assert_eq!(lookup, Lookup::Hit);
        assert_eq!(&payload[..], b"page-1");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn evicts_least_recently_used() {
        let cache = ResourceCache::new(2);
        load(&cache, 1).await;
        tokio::time::advance(Duration::from_millis(5)).await;
        load(&cache, 2).await;
        tokio::time::advance(Duration::from_millis(5)).await;

        // Touch 1 so 2 becomes the oldest
        assert!(cache.get(1).is_some());
        tokio::time::advance(Duration::from_millis(5)).await;
        load(&cache, 3).await;

        assert!(cache.contains(1));
        assert!(!cache.contains(2));
        assert!(cache.contains(3));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn equal_timestamps_fall_back_to_access_order() {
        // Paused clock: every access shares one instant
        let cache = ResourceCache::new(2);
        load(&cache, 10).await;
        load(&cache, 20).await;
        cache.get(10);
        load(&cache, 30).await;

        assert!(cache.contains(10));
        assert!(!cache.contains(20));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_load_is_not_cached() {
        let cache = ResourceCache::new(2);
        let err = cache
            .get_or_load(5, |id| async move {
                Err(MushafError::ResourceLoad {
                    id,
                    reason: "HTTP 503".to_string(),
                })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, MushafError::ResourceLoad { id: 5, .. }));
        assert!(!cache.contains(5));

        let payload = load(&cache, 5).await;
        assert_eq!(&payload[..], b"page-5");
    }

    #[tokio::test(start_paused = true)]
    async fn never_exceeds_capacity() {
        let cache = ResourceCache::new(3);
        for id in 1..=20 {
            load(&cache, id).await;
            assert!(cache.len() <= 3);
        }
    }

    #[tokio::test]
    async fn concurrent_misses_share_one_download() {
        let cache = Arc::new(ResourceCache::new(4));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            tasks.push(tokio::spawn(async move {
                cache
                    .get_or_load(42, |id| async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(page_bytes(id))
                    })
                    .await
                    .unwrap()
            }));
        }
        for task in tasks {
            assert_eq!(&task.await.unwrap()[..], b"page-42");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_load_releases_its_gate() {
        let cache = ResourceCache::new(2);
        let slow = cache.get_or_load(9, |id| async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(page_bytes(id))
        });

        let timed_out = tokio::time::timeout(Duration::from_secs(1), slow).await;
        assert!(timed_out.is_err());
        assert_eq!(cache.pending_gates(), 0);
        assert!(!cache.contains(9));
    }

    #[tokio::test]
    async fn failed_load_keeps_waiters_serialised() {
        let cache = Arc::new(ResourceCache::new(4));
        let running = Arc::new(AtomicUsize::new(0));
        let overlapped = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            let running = running.clone();
            let overlapped = overlapped.clone();
            tasks.push(tokio::spawn(async move {
                cache
                    .get_or_load(7, |id| async move {
                        if running.fetch_add(1, Ordering::SeqCst) > 0 {
                            overlapped.fetch_add(1, Ordering::SeqCst);
                        }
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        Err::<Vec<u8>, _>(MushafError::ResourceLoad {
                            id,
                            reason: "HTTP 503".to_string(),
                        })
                    })
                    .await
            }));
        }
        for task in tasks {
            assert!(task.await.unwrap().is_err());
        }

        assert_eq!(overlapped.load(Ordering::SeqCst), 0);
        assert_eq!(cache.pending_gates(), 0);
    }
}
