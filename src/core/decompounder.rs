// File: src/core/decompounder.rs
use crate::core::config::Configuration;
use crate::core::term_pool::TermPool;
use crate::core::types::{BoundaryCandidate, BoundaryContext, Penalty, Term};
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use tracing::{debug, trace};

/// Charged for a side that has no valid decomposition and is not valid
/// itself. Large enough to lose against any real split, but such a branch
/// still wins if nothing better exists.
pub const COSTLY_PENALTY: Penalty = 100;

/// Leaves ordered by text, which is byte order.
type LeafSet = Rc<BTreeSet<Rc<Term>>>;

/// Memoization for one top-level `decompound_term` call.
#[derive(Default)]
struct SplitCache {
    /// `None` marks a substring that cannot be fully decomposed.
    leaves: HashMap<String, Option<LeafSet>>,
    decomposable: HashMap<String, bool>,
}

/// Splits compound terms into their minimum-penalty parts.
///
/// Owns its term pool, so one instance serves one thread. The dictionary
/// inside the configuration may be shared by any number of instances.
pub struct Decompounder {
    config: Configuration,
    pool: TermPool,
}

impl Decompounder {
    pub fn new(config: Configuration) -> Self {
        let pool = TermPool::new(config.term_validator(), config.term_cache_entries());
        debug!(
            minimum_length = config.minimum_length(),
            interfixes = config.interfixes().len(),
            include_intermediate_terms = config.include_intermediate_terms(),
            "decompounder ready"
        );
        Self { config, pool }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// All parts of the best decompositions of `term`, sorted by bytes and
    /// deduplicated. Never contains `term` itself; empty when `term` is at
    /// or under the minimum length or cannot be fully decomposed.
    pub fn decompound_term(&mut self, term: &str) -> Vec<String> {
        let term = self.pool.term(term);
        if term.length() <= self.config.minimum_length() {
            return Vec::new();
        }

        let mut cache = SplitCache::default();
        let parts: Vec<String> = match self.collect_leaf_terms(&term, &mut cache) {
            Some(leaves) => leaves
                .iter()
                .filter(|leaf| leaf.text() != term.text())
                .map(|leaf| leaf.text().to_string())
                .collect(),
            None => Vec::new(),
        };

        trace!(term = term.text(), parts = ?parts, "decompounded");
        parts
    }

    fn collect_leaf_terms(&mut self, term: &Rc<Term>, cache: &mut SplitCache) -> Option<LeafSet> {
        if let Some(known) = cache.leaves.get(term.text()) {
            return known.clone();
        }

        if !self.is_decomposable(term, cache) {
            let leaves = term.is_valid().then(|| single(term));
            cache.leaves.insert(term.text().to_string(), leaves.clone());
            return leaves;
        }

        // Restored-`e` candidates can lead back to a term already on the
        // stack; such a revisit sees "not decomposable".
        cache.leaves.insert(term.text().to_string(), None);

        let mut best_penalty: Option<Penalty> = None;
        let mut best: BTreeSet<Rc<Term>> = BTreeSet::new();

        for candidate in self.split_candidates(term) {
            let left = candidate.left();
            let right = candidate.right();

            let (left_leaves, left_penalty) = if self.is_decomposable(left, cache) {
                self.leaves_or_self(left, cache)
            } else {
                (single(left), 0)
            };
            let (right_leaves, right_penalty) = self.leaves_or_self(right, cache);
            let penalty = left_penalty + right_penalty + candidate.penalty();

            match best_penalty {
                Some(current) if penalty > current => continue,
                Some(current) if penalty == current => {}
                _ => {
                    best_penalty = Some(penalty);
                    best.clear();
                }
            }

            best.extend(left_leaves.iter().cloned());
            best.extend(right_leaves.iter().cloned());
            if self.config.include_intermediate_terms() {
                best.insert(Rc::clone(left));
                best.insert(Rc::clone(right));
            }
        }

        let leaves = (!best.is_empty()).then(|| Rc::new(best));
        cache.leaves.insert(term.text().to_string(), leaves.clone());
        leaves
    }

    fn leaves_or_self(&mut self, term: &Rc<Term>, cache: &mut SplitCache) -> (LeafSet, Penalty) {
        match self.collect_leaf_terms(term, cache) {
            Some(leaves) => (leaves, 0),
            None if term.is_valid() => (single(term), 0),
            None => (Rc::new(BTreeSet::new()), COSTLY_PENALTY),
        }
    }

    /// Whether any cut position yields at least one candidate.
    fn is_decomposable(&mut self, term: &Rc<Term>, cache: &mut SplitCache) -> bool {
        if let Some(&known) = cache.decomposable.get(term.text()) {
            return known;
        }
        let decomposable = term
            .text()
            .char_indices()
            .enumerate()
            .skip(1)
            .any(|(split_pos, (byte_pos, _))| {
                !self.candidates_at(term, split_pos, byte_pos).is_empty()
            });
        cache.decomposable.insert(term.text().to_string(), decomposable);
        decomposable
    }

    fn split_candidates(&mut self, term: &Rc<Term>) -> Vec<BoundaryCandidate> {
        let mut candidates = Vec::new();
        for (split_pos, (byte_pos, _)) in term.text().char_indices().enumerate().skip(1) {
            candidates.extend(self.candidates_at(term, split_pos, byte_pos));
        }
        candidates
    }

    fn candidates_at(
        &mut self,
        term: &Rc<Term>,
        split_pos: usize,
        byte_pos: usize,
    ) -> Vec<BoundaryCandidate> {
        let (left, right) = term.text().split_at(byte_pos);
        let context = BoundaryContext {
            term: term.as_ref(),
            split_pos,
            left: self.pool.term(left),
            right: self.pool.term(right),
        };
        self.config.boundary_candidates(&context, &mut self.pool)
    }
}

fn single(term: &Rc<Term>) -> LeafSet {
    Rc::new(BTreeSet::from([Rc::clone(term)]))
}
