//! Bounded preload cache for media handles.
//!
//! Entries live in an LRU-ordered arena keyed by content id. Every touch
//! stamps the entry with the next value of a monotonically increasing
//! sequence; eviction removes the least recently touched entry that is not
//! the session's current item. Evicted elements are released immediately so
//! pending network activity does not accumulate.

use std::sync::Arc;

use lru::LruCache;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{LoadState, MediaBackend, MediaElement, MediaHandle};
use crate::catalog::{ContentId, ContentItem};

/// How eagerly a warmed item should be prepared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmPriority {
    /// Load and prime (silent start then pause) for instant playback
    High,
    /// Load only
    Low,
}

/// Cache entry owning one media handle.
#[derive(Debug)]
struct CacheEntry {
    handle: MediaHandle,
    loader: JoinHandle<()>,
    last_touched_sequence: u64,
}

impl CacheEntry {
    fn release(self) {
        self.loader.abort();
        self.handle.element().release();
    }
}

/// Cache statistics for monitoring
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatistics {
    pub entries: usize,
    pub capacity: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    pub eviction_count: u64,
    pub hit_rate: f64,
}

impl CacheStatistics {
    /// Calculate hit rate as a fraction of lookups
    pub fn calculate_hit_rate(hit_count: u64, miss_count: u64) -> f64 {
        if hit_count + miss_count == 0 {
            0.0
        } else {
            (hit_count as f64) / ((hit_count + miss_count) as f64)
        }
    }
}

/// Session-scoped owner of every preloaded media handle.
///
/// Must be used from within a tokio runtime: warming spawns the background
/// load task.
pub struct MediaCache {
    backend: Arc<dyn MediaBackend>,
    entries: LruCache<ContentId, CacheEntry>,
    capacity: usize,
    next_sequence: u64,
    current: Option<ContentId>,
    hit_count: u64,
    miss_count: u64,
    eviction_count: u64,
}

impl MediaCache {
    /// Creates an empty cache. A capacity of zero is treated as one.
    pub fn new(backend: Arc<dyn MediaBackend>, capacity: usize) -> Self {
        Self {
            backend,
            entries: LruCache::unbounded(),
            capacity: capacity.max(1),
            next_sequence: 0,
            current: None,
            hit_count: 0,
            miss_count: 0,
            eviction_count: 0,
        }
    }

    /// Preloads `item` in the background.
    ///
    /// Already cached items only get their recency refreshed, unless the entry
    /// was bound to another source (a fallback), in which case it is reloaded
    /// from the item's own source. Load failures are recorded in the handle
    /// state and never reported here.
    pub fn warm(&mut self, item: &ContentItem, priority: WarmPriority) {
        if self.bound_to_other_source(item) {
            tracing::debug!("Rebinding {} to its own source", item.id);
            self.insert(&item.id, &item.media_url, priority);
            return;
        }

        if self.touch(&item.id) {
            tracing::trace!("Warm for {} refreshed existing entry", item.id);
            return;
        }

        tracing::debug!("Warming {} with {:?} priority", item.id, priority);
        self.insert(&item.id, &item.media_url, priority);
    }

    /// Returns the cached handle for `item`, loading it from its source URL
    /// on a miss.
    ///
    /// An entry left on a different source by an earlier activation counts as
    /// a miss and is replaced.
    pub fn load_direct(&mut self, item: &ContentItem) -> MediaHandle {
        if self.bound_to_other_source(item) {
            self.miss_count += 1;
            tracing::debug!("Media cache entry for {} is on another source, reloading", item.id);
            return self.insert(&item.id, &item.media_url, WarmPriority::Low);
        }

        if let Some(handle) = self.get(&item.id) {
            return handle;
        }

        tracing::debug!("Loading {} directly from source", item.id);
        self.insert(&item.id, &item.media_url, WarmPriority::Low)
    }

    /// Releases the entry for `id` and replaces it with one loading `source_url`.
    pub fn replace_source(&mut self, id: &ContentId, source_url: &str) -> MediaHandle {
        if let Some(entry) = self.entries.pop(id) {
            tracing::debug!(
                "Replacing source of {} ({} -> {})",
                id,
                entry.handle.source_url(),
                source_url
            );
            entry.release();
        }

        self.insert(id, source_url, WarmPriority::Low)
    }

    /// Returns the cached handle and refreshes its recency.
    pub fn get(&mut self, id: &ContentId) -> Option<MediaHandle> {
        let sequence = self.bump_sequence();
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.last_touched_sequence = sequence;
                self.hit_count += 1;
                tracing::debug!("Media cache hit for {}", id);
                Some(entry.handle.clone())
            }
            None => {
                self.miss_count += 1;
                tracing::debug!("Media cache miss for {}", id);
                None
            }
        }
    }

    /// Returns the cached handle without touching recency or statistics.
    pub fn peek(&self, id: &ContentId) -> Option<&MediaHandle> {
        self.entries.peek(id).map(|entry| &entry.handle)
    }

    /// Pins `id` as the session's current item; it is never evicted while pinned.
    pub fn set_current(&mut self, id: Option<ContentId>) {
        self.current = id;
    }

    pub fn current(&self) -> Option<&ContentId> {
        self.current.as_ref()
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.entries.contains(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Touch sequence of the entry for `id`, if cached.
    pub fn last_touched_sequence(&self, id: &ContentId) -> Option<u64> {
        self.entries
            .peek(id)
            .map(|entry| entry.last_touched_sequence)
    }

    /// Cached ids from most to least recently touched.
    pub fn ids_by_recency(&self) -> Vec<ContentId> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn statistics(&self) -> CacheStatistics {
        CacheStatistics {
            entries: self.entries.len(),
            capacity: self.capacity,
            hit_count: self.hit_count,
            miss_count: self.miss_count,
            eviction_count: self.eviction_count,
            hit_rate: CacheStatistics::calculate_hit_rate(self.hit_count, self.miss_count),
        }
    }

    /// Releases every entry. The cache stays usable but empty.
    pub fn dispose(&mut self) {
        let released = self.entries.len();
        while let Some((_, entry)) = self.entries.pop_lru() {
            entry.release();
        }
        self.current = None;

        if released > 0 {
            tracing::debug!("Media cache disposed, released {} entries", released);
        }
    }

    fn bound_to_other_source(&self, item: &ContentItem) -> bool {
        self.entries
            .peek(&item.id)
            .is_some_and(|entry| entry.handle.source_url() != item.media_url)
    }

    fn bump_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    fn touch(&mut self, id: &ContentId) -> bool {
        let sequence = self.bump_sequence();
        match self.entries.get_mut(id) {
            Some(entry) => {
                entry.last_touched_sequence = sequence;
                true
            }
            None => false,
        }
    }

    fn insert(&mut self, id: &ContentId, source_url: &str, priority: WarmPriority) -> MediaHandle {
        let element = self.backend.create_element(id, source_url);
        let (state_sender, state_receiver) = watch::channel(LoadState::Pending);
        let handle = MediaHandle::new(id.clone(), Arc::clone(&element), state_receiver);
        let loader = spawn_loader(id.clone(), element, priority, state_sender);

        let last_touched_sequence = self.bump_sequence();
        let entry = CacheEntry {
            handle: handle.clone(),
            loader,
            last_touched_sequence,
        };
        if let Some((_, replaced)) = self.entries.push(id.clone(), entry) {
            replaced.release();
        }

        self.evict_over_capacity(id);
        handle
    }

    /// Evicts least recently touched entries until within capacity, never
    /// touching the pinned current item or the entry just inserted.
    fn evict_over_capacity(&mut self, inserted: &ContentId) {
        while self.entries.len() > self.capacity {
            let victim = self
                .entries
                .iter()
                .rev()
                .map(|(id, _)| id)
                .find(|id| Some(*id) != self.current.as_ref() && *id != inserted)
                .cloned();

            let Some(victim) = victim else {
                tracing::warn!(
                    "Media cache over capacity ({} > {}) with nothing evictable",
                    self.entries.len(),
                    self.capacity
                );
                break;
            };

            if let Some(entry) = self.entries.pop(&victim) {
                tracing::debug!(
                    "Evicting {} (last touched at sequence {})",
                    victim,
                    entry.last_touched_sequence
                );
                entry.release();
                self.eviction_count += 1;
            }
        }
    }
}

impl Drop for MediaCache {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for MediaCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaCache")
            .field("entries", &self.ids_by_recency())
            .field("capacity", &self.capacity)
            .field("current", &self.current)
            .finish()
    }
}

/// Spawns the background load for one element and publishes its outcome.
fn spawn_loader(
    id: ContentId,
    element: Arc<dyn MediaElement>,
    priority: WarmPriority,
    state: watch::Sender<LoadState>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = element.load().await {
            tracing::warn!("Preload of {} failed: {}", id, e);
            let _ = state.send(LoadState::Failed {
                reason: e.to_string(),
            });
            return;
        }

        if priority == WarmPriority::High {
            element.set_muted(true);
            match element.play().await {
                Ok(()) => element.pause(),
                Err(e) => tracing::debug!("Prime of {} skipped: {}", id, e),
            }
        }

        let _ = state.send(LoadState::Ready);
    })
}
