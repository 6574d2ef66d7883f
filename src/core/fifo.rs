// File: src/core/fifo.rs
use std::collections::{HashMap, VecDeque};

/// A string-keyed cache that evicts the oldest inserted key once full.
///
/// Reads never reorder entries, so there is no access tracking on the hot
/// path. A capacity of `0` disables eviction entirely.
#[derive(Debug, Clone)]
pub struct FifoCache<V> {
    capacity: usize,
    insertion_order: VecDeque<String>,
    entries: HashMap<String, V>,
}

impl<V> FifoCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            insertion_order: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(0)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    /// Inserts a value, evicting the oldest key first if the cache is full.
    /// O(1) amortized complexity.
    pub fn insert(&mut self, key: String, value: V) {
        if self.capacity == 0 {
            self.entries.insert(key, value);
            return;
        }

        if self.entries.contains_key(&key) {
            self.entries.insert(key, value);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.insertion_order.push_back(key.clone());
        self.entries.insert(key, value);
    }
}
