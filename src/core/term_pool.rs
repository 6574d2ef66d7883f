// File: src/core/term_pool.rs
use crate::core::fifo::FifoCache;
use crate::core::types::Term;
use crate::core::validator::TermValidator;
use std::rc::Rc;
use std::sync::Arc;

/// Interns substrings as `Term`s with their validity resolved once.
///
/// Owned by a single `Decompounder`; not meant to be shared between
/// threads. Every miss calls the validator exactly once.
pub struct TermPool {
    validator: Arc<dyn TermValidator>,
    terms: FifoCache<Rc<Term>>,
}

impl TermPool {
    /// `max_entries == 0` keeps every term for the lifetime of the pool.
    pub fn new(validator: Arc<dyn TermValidator>, max_entries: usize) -> Self {
        Self {
            validator,
            terms: FifoCache::new(max_entries),
        }
    }

    pub fn term(&mut self, text: &str) -> Rc<Term> {
        if let Some(term) = self.terms.get(text) {
            return Rc::clone(term);
        }
        let term = Rc::new(Term::new(text, self.validator.is_valid(text)));
        self.terms.insert(text.to_string(), Rc::clone(&term));
        term
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl std::fmt::Debug for TermPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermPool")
            .field("capacity", &self.terms.capacity())
            .field("len", &self.terms.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingValidator {
        calls: AtomicUsize,
    }

    impl TermValidator for CountingValidator {
        fn is_valid(&self, term: &str) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            term.starts_with('f')
        }
    }

    fn pool(max_entries: usize) -> (TermPool, Arc<CountingValidator>) {
        let validator = Arc::new(CountingValidator::default());
        (TermPool::new(validator.clone(), max_entries), validator)
    }

    #[test]
    fn resolves_validity_and_length() {
        let (mut pool, _) = pool(0);
        let foo = pool.term("foo");
        assert_eq!(foo.text(), "foo");
        assert_eq!(foo.length(), 3);
        assert!(foo.is_valid());
        assert!(!pool.term("bar").is_valid());
    }

    #[test]
    fn fifo_eviction_requeries_the_oldest_key() {
        let (mut pool, validator) = pool(2);
        for text in ["foo", "foo", "bar", "bar", "baz", "baz", "foo", "foo", "bar", "bar"] {
            pool.term(text);
        }
        // foo, bar, baz (evicts foo), foo (evicts bar), bar (evicts baz).
        assert_eq!(validator.calls.load(Ordering::SeqCst), 5);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn evicted_key_is_a_miss() {
        let (mut pool, validator) = pool(2);
        pool.term("foo");
        pool.term("bar");
        pool.term("baz");
        assert_eq!(validator.calls.load(Ordering::SeqCst), 3);

        pool.term("foo");
        assert_eq!(validator.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn unbounded_pool_never_requeries() {
        let (mut pool, validator) = pool(0);
        for _ in 0..5 {
            pool.term("foo");
            pool.term("bar");
        }
        assert_eq!(validator.calls.load(Ordering::SeqCst), 2);
        assert!(!pool.is_empty());
    }

    #[test]
    fn hits_share_the_same_allocation() {
        let (mut pool, _) = pool(0);
        let first = pool.term("foo");
        let second = pool.term("foo");
        assert!(Rc::ptr_eq(&first, &second));
    }
}
