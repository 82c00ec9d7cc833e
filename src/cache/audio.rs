//! Rendered-audio cache with LRU eviction.
//!
//! Keeps recently rendered dramas in memory, keyed by script id, so asking
//! for audio of an unchanged script does not hit the speech service again.

use std::collections::HashMap;

use crate::generation::RenderedAudio;

/// Maximum number of renders to keep in cache.
pub const DEFAULT_MAX_ENTRIES: usize = 16;

/// Audio cache with LRU eviction policy.
pub struct AudioCache {
    /// Renders indexed by script_id.
    entries: HashMap<String, CacheEntry>,
    /// Maximum number of entries to keep.
    max_entries: usize,
    /// Monotonic access counter.
    clock: u64,
}

/// A cached render with its last access tick.
struct CacheEntry {
    audio: RenderedAudio,
    last_accessed: u64,
}

impl AudioCache {
    /// Creates a new cache with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    /// Creates a new cache with specified capacity (at least one entry).
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries: max_entries.max(1),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Returns a render by script ID, marking it most recently used.
    pub fn get(&mut self, script_id: &str) -> Option<&RenderedAudio> {
        let now = self.tick();
        let entry = self.entries.get_mut(script_id)?;
        entry.last_accessed = now;
        Some(&entry.audio)
    }

    /// Inserts a render into the cache.
    ///
    /// If the cache is full, the least recently used entry is evicted first.
    pub fn put(&mut self, script_id: impl Into<String>, audio: RenderedAudio) {
        let script_id = script_id.into();
        if self.entries.len() >= self.max_entries && !self.entries.contains_key(&script_id) {
            self.evict_lru();
        }

        let now = self.tick();
        self.entries.insert(
            script_id,
            CacheEntry {
                audio,
                last_accessed: now,
            },
        );
    }

    /// Checks if a script ID exists in the cache.
    pub fn contains(&self, script_id: &str) -> bool {
        self.entries.contains_key(script_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Evicts the least recently used entry and returns it.
    pub fn evict_lru(&mut self) -> Option<RenderedAudio> {
        let oldest_key = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(k, _)| k.clone())?;

        self.entries.remove(&oldest_key).map(|entry| entry.audio)
    }

    /// Clears all entries from the cache.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for AudioCache {
    fn default() -> Self {
        Self::new()
    }
}
