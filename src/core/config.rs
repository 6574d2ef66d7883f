// File: src/core/config.rs
use crate::core::term_pool::TermPool;
use crate::core::types::{BoundaryCandidate, BoundaryContext, Penalty};
use crate::core::validator::{DefaultTermValidator, TermValidator};
use crate::dictionary::Dictionary;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

/// A linking morpheme between two compound parts, e.g. German `s` in
/// `wartung|s|vertrag`, together with the penalty for removing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interfix {
    text: String,
    cost: Penalty,
}

impl Interfix {
    pub fn new(text: impl Into<String>, cost: Penalty) -> Self {
        Self {
            text: text.into(),
            cost,
        }
    }

    /// Cost equal to the interfix length, so `s` (1) beats `es` (2).
    pub fn weighted(text: impl Into<String>) -> Self {
        let text = text.into();
        let cost = text.chars().count() as Penalty;
        Self { text, cost }
    }

    /// Every interfix costs the same.
    pub fn uniform(text: impl Into<String>) -> Self {
        Self::new(text, 1)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cost(&self) -> Penalty {
        self.cost
    }
}

/// Proposes extra boundary candidates after the direct and interfix ones.
///
/// This is the only locale-specific hook into splitting; everything else a
/// locale controls is plain data on `Configuration`.
pub trait CandidateGenerator: Send + Sync {
    fn candidates(
        &self,
        context: &BoundaryContext<'_>,
        pool: &mut TermPool,
        out: &mut Vec<BoundaryCandidate>,
    );
}

/// German drops a final `e` before a compound boundary: `Schul(e)hof`.
/// When only the right side is valid, retry the left with an `e` appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreElidedE {
    penalty: Penalty,
}

impl RestoreElidedE {
    pub fn new(penalty: Penalty) -> Self {
        Self { penalty }
    }
}

impl Default for RestoreElidedE {
    fn default() -> Self {
        Self::new(1)
    }
}

impl CandidateGenerator for RestoreElidedE {
    fn candidates(
        &self,
        context: &BoundaryContext<'_>,
        pool: &mut TermPool,
        out: &mut Vec<BoundaryCandidate>,
    ) {
        let left = &context.left;
        if !context.right.is_valid() || left.is_valid() || left.text().ends_with('e') {
            return;
        }
        let restored = pool.term(&format!("{}e", left.text()));
        out.extend(BoundaryCandidate::new(
            restored,
            Rc::clone(&context.right),
            self.penalty,
        ));
    }
}

/// Per-locale decomposition policy.
///
/// Immutable once handed to a `Decompounder`; the `with_*` methods consume
/// and return a modified copy.
#[derive(Clone)]
pub struct Configuration {
    dictionary: Arc<dyn Dictionary>,
    minimum_length: usize,
    interfixes: Vec<Interfix>,
    allow_list: HashSet<String>,
    include_intermediate_terms: bool,
    generators: Vec<Arc<dyn CandidateGenerator>>,
    validator: Arc<dyn TermValidator>,
    custom_validator: bool,
    term_cache_entries: usize,
}

impl Configuration {
    pub fn new(dictionary: Arc<dyn Dictionary>, minimum_length: usize) -> Self {
        let validator = Arc::new(DefaultTermValidator::new(
            Arc::clone(&dictionary),
            minimum_length,
            HashSet::new(),
        ));
        Self {
            dictionary,
            minimum_length,
            interfixes: Vec::new(),
            allow_list: HashSet::new(),
            include_intermediate_terms: false,
            generators: Vec::new(),
            validator,
            custom_validator: false,
            term_cache_entries: 0,
        }
    }

    /// Interfixes are tried in the given order.
    pub fn with_interfixes(
        mut self,
        interfixes: impl IntoIterator<Item = Interfix>,
    ) -> Result<Self, ConfigError> {
        let interfixes: Vec<Interfix> = interfixes.into_iter().collect();
        if interfixes.iter().any(|i| i.text.is_empty()) {
            return Err(ConfigError::EmptyInterfix);
        }
        self.interfixes = interfixes;
        Ok(self)
    }

    /// Every entry must be shorter than the minimum length; anything else
    /// could never be consulted and is rejected.
    pub fn with_allow_list<I, S>(mut self, terms: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut allow_list = HashSet::new();
        for term in terms {
            let term = term.into();
            let length = term.chars().count();
            if length >= self.minimum_length {
                return Err(ConfigError::AllowListTermTooLong {
                    term,
                    length,
                    minimum: self.minimum_length,
                });
            }
            allow_list.insert(term);
        }
        self.allow_list = allow_list;
        if !self.custom_validator {
            self.validator = self.default_validator();
        }
        Ok(self)
    }

    pub fn with_intermediate_terms(mut self, include: bool) -> Self {
        self.include_intermediate_terms = include;
        self
    }

    pub fn with_candidate_generator(
        mut self,
        generator: impl CandidateGenerator + 'static,
    ) -> Self {
        self.generators.push(Arc::new(generator));
        self
    }

    /// Replaces the dictionary plus allow-list rule entirely.
    pub fn with_term_validator(mut self, validator: Arc<dyn TermValidator>) -> Self {
        self.validator = validator;
        self.custom_validator = true;
        self
    }

    /// Capacity of the term pool each `Decompounder` builds; `0` is unbounded.
    pub fn with_term_cache_entries(mut self, entries: usize) -> Self {
        self.term_cache_entries = entries;
        self
    }

    pub fn dictionary(&self) -> &Arc<dyn Dictionary> {
        &self.dictionary
    }

    pub fn minimum_length(&self) -> usize {
        self.minimum_length
    }

    pub fn interfixes(&self) -> &[Interfix] {
        &self.interfixes
    }

    pub fn allow_list(&self) -> &HashSet<String> {
        &self.allow_list
    }

    pub fn include_intermediate_terms(&self) -> bool {
        self.include_intermediate_terms
    }

    pub fn term_cache_entries(&self) -> usize {
        self.term_cache_entries
    }

    pub fn term_validator(&self) -> Arc<dyn TermValidator> {
        Arc::clone(&self.validator)
    }

    pub fn is_valid(&self, term: &str) -> bool {
        self.validator.is_valid(term)
    }

    /// All accepted splits at one cut position, in order: the direct split
    /// (penalty 0), one per matching interfix, then each generator's.
    pub fn boundary_candidates(
        &self,
        context: &BoundaryContext<'_>,
        pool: &mut TermPool,
    ) -> Vec<BoundaryCandidate> {
        let mut candidates = Vec::new();
        candidates.extend(BoundaryCandidate::new(
            Rc::clone(&context.left),
            Rc::clone(&context.right),
            0,
        ));

        if context.left.is_valid() {
            for interfix in &self.interfixes {
                let Some(rest) = context.right.text().strip_prefix(interfix.text()) else {
                    continue;
                };
                if rest.is_empty() {
                    continue;
                }
                let rest = pool.term(rest);
                candidates.extend(BoundaryCandidate::new(
                    Rc::clone(&context.left),
                    rest,
                    interfix.cost(),
                ));
            }
        }

        for generator in &self.generators {
            generator.candidates(context, pool, &mut candidates);
        }
        candidates
    }

    fn default_validator(&self) -> Arc<dyn TermValidator> {
        Arc::new(DefaultTermValidator::new(
            Arc::clone(&self.dictionary),
            self.minimum_length,
            self.allow_list.clone(),
        ))
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("minimum_length", &self.minimum_length)
            .field("interfixes", &self.interfixes)
            .field("allow_list", &self.allow_list.len())
            .field("include_intermediate_terms", &self.include_intermediate_terms)
            .field("generators", &self.generators.len())
            .field("custom_validator", &self.custom_validator)
            .field("term_cache_entries", &self.term_cache_entries)
            .finish()
    }
}
