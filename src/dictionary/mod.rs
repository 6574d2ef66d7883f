// File: src/dictionary/mod.rs
use std::collections::HashSet;
use std::sync::Arc;

pub mod builder;
pub mod cache;
pub mod codec;
pub mod index;
pub mod variant;

pub use builder::DictionaryWriter;
pub use cache::MemoryCacheDictionary;
pub use index::BinaryDictionary;
pub use variant::{SuffixRule, SuffixVariantExpander, VariantDictionary, VariantExpander};

/// An immutable set of known terms.
///
/// Implementations must be read-only after construction so a single
/// dictionary can be shared across threads behind an `Arc`.
pub trait Dictionary: Send + Sync {
    /// True iff the exact byte string is a known term.
    fn has(&self, term: &str) -> bool;
}

impl<D: Dictionary + ?Sized> Dictionary for Arc<D> {
    fn has(&self, term: &str) -> bool {
        (**self).has(term)
    }
}

impl<D: Dictionary + ?Sized> Dictionary for Box<D> {
    fn has(&self, term: &str) -> bool {
        (**self).has(term)
    }
}

impl Dictionary for HashSet<String> {
    fn has(&self, term: &str) -> bool {
        self.contains(term)
    }
}
