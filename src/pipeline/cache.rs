//! Bounded thumbnail cache keyed by page and zoom.
//!
//! Eviction is by insertion order, not by access: lookups use
//! [`LruCache::peek`], which never refreshes an entry, so the entry evicted
//! on overflow is always the one inserted longest ago.

use image::DynamicImage;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Cache key for a rendered page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// 0-based page index.
    pub page_index: usize,
    /// Zoom factor stored as millionths for stable hashing.
    pub zoom_millionths: u64,
}

impl CacheKey {
    #[must_use]
    pub fn new(page_index: usize, zoom: f32) -> Self {
        Self {
            page_index,
            zoom_millionths: (zoom as f64 * 1_000_000.0).round() as u64,
        }
    }
}

/// Fixed-capacity map from [`CacheKey`] to a rendered image.
pub struct RenderCache {
    entries: LruCache<CacheKey, Arc<DynamicImage>>,
}

impl RenderCache {
    /// Create a cache holding at most `capacity` images (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::new(NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN)),
        }
    }

    /// Look up an image without touching its eviction position.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<DynamicImage>> {
        self.entries.peek(key).cloned()
    }

    /// Insert an image, evicting the oldest insertion if the cache is full.
    ///
    /// Returns the evicted key, if any.
    pub fn insert(&mut self, key: CacheKey, image: Arc<DynamicImage>) -> Option<CacheKey> {
        if self.entries.contains(&key) {
            // Replacing an entry keeps its original insertion slot.
            if let Some(slot) = self.entries.peek_mut(&key) {
                *slot = image;
            }
            return None;
        }
        self.entries.push(key, image).map(|(evicted, _)| evicted)
    }

    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
