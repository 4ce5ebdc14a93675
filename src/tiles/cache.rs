use crate::core::geo::TileCoord;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Identifies a tile of a particular basemap
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub layer: String,
    pub coord: TileCoord,
}

impl TileKey {
    pub fn new(layer: impl Into<String>, coord: TileCoord) -> Self {
        Self {
            layer: layer.into(),
            coord,
        }
    }
}

/// In-memory tile cache using LRU eviction
#[derive(Debug)]
pub struct TileCache<V> {
    cache: LruCache<TileKey, V>,
}

impl<V> TileCache<V> {
    /// Create a new tile cache; a zero capacity holds a single tile
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
        }
    }

    /// Get a tile, marking it most recently used
    pub fn get(&mut self, key: &TileKey) -> Option<&V> {
        self.cache.get(key)
    }

    /// Get a tile without touching its recency
    pub fn peek(&self, key: &TileKey) -> Option<&V> {
        self.cache.peek(key)
    }

    /// Insert a tile, returning the evicted least-recently-used entry if any
    pub fn put(&mut self, key: TileKey, value: V) -> Option<(TileKey, V)> {
        self.cache.push(key, value)
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.cache.contains(key)
    }

    pub fn remove(&mut self, key: &TileKey) -> Option<V> {
        self.cache.pop(key)
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}

impl<V> Default for TileCache<V> {
    fn default() -> Self {
        Self::new(512)
    }
}
