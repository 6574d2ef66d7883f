// File: src/core/validator.rs
use crate::dictionary::Dictionary;
use std::collections::HashSet;
use std::sync::Arc;

/// Decides whether a substring counts as a usable compound part.
pub trait TermValidator: Send + Sync {
    fn is_valid(&self, term: &str) -> bool;
}

/// Dictionary lookup at or above the minimum length, allow list below it.
///
/// Natural-language word lists are full of implausible two and three
/// letter entries, so short parts never reach the dictionary.
pub struct DefaultTermValidator {
    dictionary: Arc<dyn Dictionary>,
    minimum_length: usize,
    allow_list: HashSet<String>,
}

impl DefaultTermValidator {
    pub fn new(
        dictionary: Arc<dyn Dictionary>,
        minimum_length: usize,
        allow_list: HashSet<String>,
    ) -> Self {
        Self {
            dictionary,
            minimum_length,
            allow_list,
        }
    }
}

impl TermValidator for DefaultTermValidator {
    fn is_valid(&self, term: &str) -> bool {
        if term.chars().count() < self.minimum_length {
            return self.allow_list.contains(term);
        }
        self.dictionary.has(term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::BinaryDictionary;

    fn validator(allow: &[&str]) -> DefaultTermValidator {
        let dictionary = BinaryDictionary::from_terms(["haus", "tur", "ei"]).unwrap();
        DefaultTermValidator::new(
            Arc::new(dictionary),
            4,
            allow.iter().map(|t| t.to_string()).collect(),
        )
    }

    #[test]
    fn short_terms_need_the_allow_list() {
        let validator = validator(&["ei"]);
        assert!(validator.is_valid("ei"));
        // In the dictionary but below the minimum and not allowed.
        assert!(!validator.is_valid("tur"));
    }

    #[test]
    fn long_terms_ignore_the_allow_list() {
        let validator = validator(&["ei"]);
        assert!(validator.is_valid("haus"));
        assert!(!validator.is_valid("maus"));
    }

    #[test]
    fn length_is_measured_in_codepoints() {
        let dictionary = BinaryDictionary::from_terms(["tür"]).unwrap();
        let validator = DefaultTermValidator::new(Arc::new(dictionary), 4, HashSet::new());
        // Four bytes, three codepoints.
        assert!(!validator.is_valid("tür"));
    }
}
