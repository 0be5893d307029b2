//! Cache hit/miss counters and per-endpoint request metrics

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Durations kept per endpoint for the rolling average
const TIMING_WINDOW: usize = 100;

/// Snapshot read by the health surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entries currently held across all caches
    pub size: usize,
    /// Hits over lookups, 0.0 when nothing was looked up yet
    pub hit_rate: f64,
}

/// Per-endpoint request summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointStats {
    pub avg_response_ms: f64,
    pub total_requests: usize,
    pub errors: u64,
}

/// Process-wide counters shared by loaders and the fetcher
#[derive(Debug, Default)]
pub struct Metrics {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: Mutex<HashMap<String, u64>>,
    timings: Mutex<HashMap<String, VecDeque<Duration>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, endpoint: &str) {
        *lock(&self.errors).entry(endpoint.to_string()).or_insert(0) += 1;
    }

    /// Record a completed request, keeping the last 100 per endpoint
    pub fn record_request(&self, endpoint: &str, duration: Duration) {
        let mut timings = lock(&self.timings);
        let window = timings.entry(endpoint.to_string()).or_default();
        window.push_back(duration);
        if window.len() > TIMING_WINDOW {
            window.pop_front();
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Error count per endpoint
    pub fn error_counts(&self) -> BTreeMap<String, u64> {
        lock(&self.errors)
            .iter()
            .map(|(endpoint, count)| (endpoint.clone(), *count))
            .collect()
    }

    pub fn total_errors(&self) -> u64 {
        lock(&self.errors).values().sum()
    }

    /// Average latency and counts for every endpoint seen so far
    pub fn endpoint_stats(&self) -> BTreeMap<String, EndpointStats> {
        let errors = self.error_counts();
        let timings = lock(&self.timings);

        let mut stats: BTreeMap<String, EndpointStats> = timings
            .iter()
            .map(|(endpoint, window)| {
                let total: Duration = window.iter().sum();
                let avg_response_ms = if window.is_empty() {
                    0.0
                } else {
                    total.as_secs_f64() * 1000.0 / window.len() as f64
                };
                let stats = EndpointStats {
                    avg_response_ms,
                    total_requests: window.len(),
                    errors: errors.get(endpoint).copied().unwrap_or(0),
                };
                (endpoint.clone(), stats)
            })
            .collect();

        // Endpoints that only ever failed
        for (endpoint, count) in errors {
            stats.entry(endpoint).or_insert(EndpointStats {
                avg_response_ms: 0.0,
                total_requests: 0,
                errors: count,
            });
        }
        stats
    }
}
