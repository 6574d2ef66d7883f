// src/core/types.rs
use std::rc::Rc;

/// Penalty assigned to a split. Lower is preferred.
pub type Penalty = u32;

/// A candidate substring together with its resolved validity.
/// Produced by the `TermPool`, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term {
    text: String,
    /// Unicode codepoint count, not bytes.
    length: usize,
    is_valid: bool,
}

impl Term {
    pub fn new(text: impl Into<String>, is_valid: bool) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Self { text, length, is_valid }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }
}

/// One cut position inside the term being decomposed.
/// `split_pos` counts codepoints; `left` and `right` are the two halves.
#[derive(Debug)]
pub struct BoundaryContext<'a> {
    pub term: &'a Term,
    pub split_pos: usize,
    pub left: Rc<Term>,
    pub right: Rc<Term>,
}

/// An accepted way to split a term. Both sides are always valid terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryCandidate {
    left: Rc<Term>,
    right: Rc<Term>,
    penalty: Penalty,
}

impl BoundaryCandidate {
    /// Returns `None` unless both sides are valid.
    pub fn new(left: Rc<Term>, right: Rc<Term>, penalty: Penalty) -> Option<Self> {
        if !left.is_valid() || !right.is_valid() {
            return None;
        }
        Some(Self { left, right, penalty })
    }

    pub fn left(&self) -> &Rc<Term> {
        &self.left
    }

    pub fn right(&self) -> &Rc<Term> {
        &self.right
    }

    pub fn penalty(&self) -> Penalty {
        self.penalty
    }
}
