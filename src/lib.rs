// src/lib.rs

pub mod core;
pub mod dictionary;
pub mod error;
pub mod locale;
pub mod persistence;

pub use crate::core::config::{CandidateGenerator, Configuration, Interfix, RestoreElidedE};
pub use crate::core::decompounder::Decompounder;
pub use crate::core::term_pool::TermPool;
pub use crate::core::types::{BoundaryCandidate, BoundaryContext, Penalty, Term};
pub use crate::core::validator::{DefaultTermValidator, TermValidator};
pub use crate::dictionary::{BinaryDictionary, Dictionary, DictionaryWriter};
pub use crate::error::{ConfigError, DictionaryError, Error};
pub use crate::locale::{Locale, LocalePolicy};
