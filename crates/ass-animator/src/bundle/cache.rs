//! Bounded bundle cache keyed by event content hash

use super::{Bundle, BundleBuilder, BundleKey};
use crate::event::DialogueEvent;
use crate::utils::AnimatorError;
use ahash::AHashMap;

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: usize,
    /// Lookups that built a new bundle
    pub misses: usize,
    /// Bundles dropped to respect the capacity
    pub evictions: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheEntry {
    bundle: Bundle,
    last_used: u64,
}

/// Least-recently-used bundle cache
///
/// Holds at most `capacity` bundles. Scheduled bundles are never evicted, so
/// the cache may temporarily exceed its bound while every entry is in use.
pub struct BundleCache {
    entries: AHashMap<BundleKey, CacheEntry>,
    capacity: usize,
    clock: u64,
    stats: CacheStats,
}

impl BundleCache {
    /// Create a cache holding up to `capacity` bundles
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: AHashMap::new(),
            capacity: capacity.max(1),
            clock: 0,
            stats: CacheStats::default(),
        }
    }

    /// Look up the bundle of `event`, building it on a miss
    pub fn get_or_build(
        &mut self,
        event: &DialogueEvent,
        builder: &BundleBuilder<'_>,
    ) -> Result<BundleKey, AnimatorError> {
        let key = BundleKey::of(event)?;
        if self.touch(key) {
            self.stats.hits += 1;
            return Ok(key);
        }

        self.stats.misses += 1;
        self.insert(builder.build_with_key(event, key));
        Ok(key)
    }

    /// Store a bundle, evicting the least recently used one when full
    pub fn insert(&mut self, bundle: Bundle) {
        if !self.entries.contains_key(&bundle.key) {
            while self.entries.len() >= self.capacity {
                if self.evict_one().is_none() {
                    log::debug!(
                        "bundle cache over capacity ({}), every entry is scheduled",
                        self.capacity
                    );
                    break;
                }
            }
        }
        self.clock += 1;
        self.entries.insert(
            bundle.key,
            CacheEntry {
                bundle,
                last_used: self.clock,
            },
        );
    }

    /// Mark a bundle as recently used; false if it is not cached
    pub fn touch(&mut self, key: BundleKey) -> bool {
        self.clock += 1;
        match self.entries.get_mut(&key) {
            Some(entry) => {
                entry.last_used = self.clock;
                true
            }
            None => false,
        }
    }

    fn evict_one(&mut self) -> Option<BundleKey> {
        let victim = self
            .entries
            .iter()
            .filter(|(_, entry)| !entry.bundle.is_scheduled())
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| *key)?;

        self.entries.remove(&victim);
        self.stats.evictions += 1;
        log::debug!("evicted bundle {victim}");
        Some(victim)
    }

    /// Get a cached bundle
    pub fn get(&self, key: BundleKey) -> Option<&Bundle> {
        self.entries.get(&key).map(|entry| &entry.bundle)
    }

    /// Get a cached bundle mutably
    pub fn get_mut(&mut self, key: BundleKey) -> Option<&mut Bundle> {
        self.entries.get_mut(&key).map(|entry| &mut entry.bundle)
    }

    /// Check if a bundle is cached
    pub fn contains(&self, key: BundleKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Iterate over cached bundles in no particular order
    pub fn bundles(&self) -> impl Iterator<Item = &Bundle> {
        self.entries.values().map(|entry| &entry.bundle)
    }

    /// Drop every bundle and reset statistics
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }

    /// Number of cached bundles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of unscheduled bundles kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
