use lru::LruCache;
use parking_lot::Mutex;
use store::BeaconStateSummary;
use types::{BeaconState, Hash256};

const DEFAULT_CACHE_SIZE: usize = 4;

/// Caches full post-state copies for recently processed blocks, so a chain of blocks arriving
/// close together doesn't each pay for a fresh DB read of their (shared) recent ancestry.
pub struct HotStateCache {
    cache: Mutex<LruCache<Hash256, BeaconState>>,
}

impl HotStateCache {
    pub fn new(capacity: usize) -> Self {
        Self { cache: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn get(&self, root: &Hash256) -> Option<BeaconState> {
        self.cache.lock().get(root).cloned()
    }

    pub fn put(&self, root: Hash256, state: BeaconState) {
        self.cache.lock().put(root, state);
    }
}

impl Default for HotStateCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

/// Caches the full state at recent epoch boundaries — the states `ReplayBlocks` anchors on when
/// bridging a gap inside the hot region.
pub struct EpochBoundaryStateCache {
    cache: Mutex<LruCache<Hash256, BeaconState>>,
}

impl EpochBoundaryStateCache {
    pub fn new(capacity: usize) -> Self {
        Self { cache: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn get(&self, root: &Hash256) -> Option<BeaconState> {
        self.cache.lock().get(root).cloned()
    }

    pub fn put(&self, root: Hash256, state: BeaconState) {
        self.cache.lock().put(root, state);
    }
}

impl Default for EpochBoundaryStateCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }
}

/// Caches `StateSummary` lookups so `StateByRoot` doesn't round-trip to the DB twice for the same
/// root (once to resolve the summary, again on a cache-hit retry after a miss elsewhere).
pub struct StateSummaryCache {
    cache: Mutex<LruCache<Hash256, BeaconStateSummary>>,
}

impl StateSummaryCache {
    pub fn new(capacity: usize) -> Self {
        Self { cache: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn get(&self, root: &Hash256) -> Option<BeaconStateSummary> {
        self.cache.lock().get(root).copied()
    }

    pub fn put(&self, root: Hash256, summary: BeaconStateSummary) {
        self.cache.lock().put(root, summary);
    }
}

impl Default for StateSummaryCache {
    fn default() -> Self {
        Self::new(128)
    }
}
