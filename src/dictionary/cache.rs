// File: src/dictionary/cache.rs
use crate::core::fifo::FifoCache;
use crate::dictionary::Dictionary;
use std::sync::{Arc, Mutex};

/// Memoizes `has` answers of another dictionary.
///
/// Shared across threads, so the cache sits behind a mutex. A capacity of
/// `0` keeps every answer for the lifetime of the wrapper.
pub struct MemoryCacheDictionary {
    inner: Arc<dyn Dictionary>,
    answers: Mutex<FifoCache<bool>>,
}

impl MemoryCacheDictionary {
    pub const DEFAULT_MAX_ENTRIES: usize = 15_000;

    pub fn new(inner: Arc<dyn Dictionary>, max_entries: usize) -> Self {
        Self {
            inner,
            answers: Mutex::new(FifoCache::new(max_entries)),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FifoCache<bool>> {
        // Entries are plain bools, a poisoned lock is still usable.
        self.answers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Dictionary for MemoryCacheDictionary {
    fn has(&self, term: &str) -> bool {
        if let Some(&known) = self.lock().get(term) {
            return known;
        }
        // Not held across the inner lookup.
        let found = self.inner.has(term);
        self.lock().insert(term.to_string(), found);
        found
    }
}

impl std::fmt::Debug for MemoryCacheDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCacheDictionary")
            .field("cached_entries", &self.cached_entries())
            .finish_non_exhaustive()
    }
}
