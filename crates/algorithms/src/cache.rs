//! LRU memoization cache for pure sub-computations.
//!
//! Keys are SHA-256 digests of a canonical byte encoding of the call
//! arguments. Array arguments are hashed by value (float bit patterns,
//! timestamps as nanoseconds), so two equal inputs always share a key no
//! matter where they live in memory.

use chrono::{DateTime, Utc};
use lru::LruCache;
use pvirr_core::constants::CACHE_CAPACITY_DEFAULT;
use pvirr_core::{Result, TimeSeries, Timestamps};
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Hex digest identifying one call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Incremental builder for a [`CacheKey`].
///
/// Every field is length- or type-prefixed so that adjacent fields cannot
/// run into each other.
pub struct KeyBuilder {
    hasher: Sha256,
}

impl KeyBuilder {
    /// Start a key for the named operation
    pub fn new(operation: &str) -> Self {
        let mut b = Self {
            hasher: Sha256::new(),
        };
        b.put(b's', operation.as_bytes());
        b
    }

    fn put(&mut self, tag: u8, bytes: &[u8]) {
        self.hasher.update([tag]);
        self.hasher.update((bytes.len() as u64).to_le_bytes());
        self.hasher.update(bytes);
    }

    pub fn str(mut self, value: &str) -> Self {
        self.put(b's', value.as_bytes());
        self
    }

    pub fn f64(mut self, value: f64) -> Self {
        self.put(b'f', &value.to_bits().to_le_bytes());
        self
    }

    pub fn bool(mut self, value: bool) -> Self {
        self.put(b'b', &[value as u8]);
        self
    }

    pub fn f64s(mut self, values: &[f64]) -> Self {
        let bytes: Vec<u8> = values
            .iter()
            .flat_map(|v| v.to_bits().to_le_bytes())
            .collect();
        self.put(b'a', &bytes);
        self
    }

    pub fn series(self, series: &TimeSeries<f64>) -> Self {
        self.f64s(&series.to_vec())
    }

    pub fn timestamps(mut self, timestamps: &Timestamps) -> Self {
        let bytes: Vec<u8> = timestamps
            .iter()
            .flat_map(|t| instant_bytes(t))
            .collect();
        self.put(b't', &bytes);
        self
    }

    pub fn finish(self) -> CacheKey {
        CacheKey(hex::encode(self.hasher.finalize()))
    }
}

fn instant_bytes(t: &DateTime<Utc>) -> [u8; 12] {
    let mut out = [0u8; 12];
    out[..8].copy_from_slice(&t.timestamp().to_le_bytes());
    out[8..].copy_from_slice(&t.timestamp_subsec_nanos().to_le_bytes());
    out
}

/// Snapshot of cache counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub len: usize,
    pub capacity: usize,
}

/// Bounded LRU cache shared behind a mutex.
///
/// Share one instance across threads with `Arc`. Entries are evicted by
/// recency or dropped all at once by [`MemoCache::clear`].
pub struct MemoCache<V> {
    inner: Mutex<LruCache<CacheKey, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> MemoCache<V> {
    /// Create a new cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<CacheKey, V>> {
        // a panic while holding the lock cannot leave an entry half-written
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached value for `key`, if present. Marks the entry as recently used.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Insert a value, evicting the least recently used entry if full.
    pub fn insert(&self, key: CacheKey, value: V) {
        self.lock().put(key, value);
    }

    /// Return the cached value for `key` or compute, store and return it.
    ///
    /// Errors from `compute` are returned and not cached.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        let short = &key.as_str()[..12];
        if let Some(v) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(key = short, "cache hit");
            return Ok(v);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(key = short, "cache miss");
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let guard = self.lock();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            len: guard.len(),
            capacity: guard.cap().get(),
        }
    }
}

impl<V: Clone> Default for MemoCache<V> {
    fn default() -> Self {
        Self::new(CACHE_CAPACITY_DEFAULT)
    }
}
