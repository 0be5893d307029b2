//! In-memory caches shared by every handler
//!
//! | Cache | Bound | Eviction | Expiry |
//! |-------|-------|----------|--------|
//! | [`ExpiringCache`] | entry count | oldest inserted | per-entry TTL, lazy |
//! | [`ResourceCache`] | entry count | least recently used | none |
//!
//! Entries are immutable once stored; writers only ever replace whole
//! values. A race between two handlers missing on the same key costs at
//! most one extra fetch.

pub mod expiring;
pub mod resource;
pub mod stats;

pub use expiring::{CacheEntry, ExpiringCache};
pub use resource::{Lookup, Payload, ResourceCache, ResourceEntry};
pub use stats::{CacheStats, EndpointStats, Metrics};
