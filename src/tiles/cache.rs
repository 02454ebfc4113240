use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::core::constants::DEFAULT_TILE_CACHE_SIZE;

/// In-memory resource cache keyed by URL, using LRU eviction
///
/// Clones share the same storage, so the file source and its worker tasks can
/// each hold one.
#[derive(Debug)]
pub struct TileCache {
    cache: Arc<Mutex<LruCache<String, Arc<Vec<u8>>>>>,
}

impl TileCache {
    /// Create a new cache with the given capacity; zero falls back to the default
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_TILE_CACHE_SIZE))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Get an entry, marking it recently used
    pub fn get(&self, url: &str) -> Option<Arc<Vec<u8>>> {
        self.cache.lock().ok()?.get(url).cloned()
    }

    /// Insert an entry
    pub fn insert(&self, url: impl Into<String>, data: Vec<u8>) -> Arc<Vec<u8>> {
        let data = Arc::new(data);
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(url.into(), Arc::clone(&data));
        }
        data
    }

    /// Check for an entry without touching its recency
    pub fn contains(&self, url: &str) -> bool {
        self.cache
            .lock()
            .ok()
            .map(|cache| cache.contains(url))
            .unwrap_or(false)
    }

    pub fn remove(&self, url: &str) -> Option<Arc<Vec<u8>>> {
        self.cache.lock().ok()?.pop(url)
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().ok().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.cache
            .lock()
            .ok()
            .map(|cache| cache.cap().get())
            .unwrap_or(0)
    }
}

impl Clone for TileCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_CACHE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_cache_basic_operations() {
        let cache = TileCache::new(2);
        assert!(cache.is_empty());

        cache.insert("https://tiles/1/0/0.pbf", vec![1, 2, 3]);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("https://tiles/1/0/0.pbf"));
        assert_eq!(*cache.get("https://tiles/1/0/0.pbf").unwrap(), vec![1, 2, 3]);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_tile_cache_lru_eviction() {
        let cache = TileCache::new(2);
        cache.insert("a", vec![1]);
        cache.insert("b", vec![2]);
        // touch "a" so "b" is the eviction candidate
        cache.get("a");
        cache.insert("c", vec![3]);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = TileCache::new(4);
        let other = cache.clone();
        other.insert("shared", vec![9]);
        assert!(cache.contains("shared"));
        assert_eq!(cache.capacity(), 4);
    }

    #[test]
    fn test_zero_capacity_uses_default() {
        assert_eq!(TileCache::new(0).capacity(), DEFAULT_TILE_CACHE_SIZE);
    }
}
