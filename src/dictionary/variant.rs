// File: src/dictionary/variant.rs
use crate::dictionary::Dictionary;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Produces alternative spellings under which a term may be listed.
pub trait VariantExpander: Send + Sync {
    /// Variants of `term`, never including `term` itself.
    fn expand(&self, term: &str) -> Vec<String>;
}

/// A single `ending -> replacement` rewrite anchored at the end of a term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffixRule {
    pub ending: String,
    pub replacement: String,
}

impl SuffixRule {
    pub fn new(ending: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            ending: ending.into(),
            replacement: replacement.into(),
        }
    }

    fn apply(&self, term: &str) -> Option<String> {
        if self.ending.is_empty() || self.ending == self.replacement {
            return None;
        }
        let stem = term.strip_suffix(self.ending.as_str())?;
        Some(format!("{stem}{}", self.replacement))
    }
}

/// Expands a term by rewriting its ending, one rule at a time.
/// `kunstlerinnen` becomes `kunstlerin` under the rule `innen -> in`.
#[derive(Debug, Clone, Default)]
pub struct SuffixVariantExpander {
    rules: Vec<SuffixRule>,
}

impl SuffixVariantExpander {
    pub fn new(rules: Vec<SuffixRule>) -> Self {
        Self { rules }
    }
}

impl VariantExpander for SuffixVariantExpander {
    fn expand(&self, term: &str) -> Vec<String> {
        let mut variants: Vec<String> = Vec::new();
        for variant in self.rules.iter().filter_map(|rule| rule.apply(term)) {
            if !variants.contains(&variant) {
                variants.push(variant);
            }
        }
        variants
    }
}

/// Accepts a term if it or any of its variants is in the inner dictionary.
pub struct VariantDictionary {
    inner: Arc<dyn Dictionary>,
    expander: Box<dyn VariantExpander>,
}

impl VariantDictionary {
    pub fn new(inner: Arc<dyn Dictionary>, expander: impl VariantExpander + 'static) -> Self {
        Self {
            inner,
            expander: Box::new(expander),
        }
    }
}

impl Dictionary for VariantDictionary {
    fn has(&self, term: &str) -> bool {
        self.inner.has(term)
            || self
                .expander
                .expand(term)
                .iter()
                .any(|variant| self.inner.has(variant))
    }
}
