// File: src/dictionary/builder.rs
use crate::dictionary::codec::{self, EncodeSummary};
use crate::error::DictionaryError;
use crate::persistence;
use std::path::Path;
use tracing::debug;

/// Collects terms for the offline write path.
///
/// `write` consumes the writer: once an archive exists on disk there is no
/// handle left through which it could be extended.
#[derive(Debug, Default)]
pub struct DictionaryWriter {
    terms: Vec<String>,
}

impl DictionaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, term: impl Into<String>) {
        self.terms.push(term.into());
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sorts by raw bytes, drops duplicates and unstorable terms, and writes
    /// `dictionary.gz` into `dir`. Any derived files already in `dir` are
    /// left alone; the next load notices they belong to an older archive.
    pub fn write(mut self, dir: &Path) -> Result<EncodeSummary, DictionaryError> {
        let collected = self.terms.len();
        self.terms.sort_unstable();
        self.terms.dedup();
        debug!(collected, unique = self.terms.len(), "sorted dictionary terms");

        let mut summary = persistence::write_archive(dir, &self.terms)?;
        summary.skipped += collected - self.terms.len();
        Ok(summary)
    }

    /// Whether `term` would survive `write`.
    pub fn accepts(term: &str) -> bool {
        codec::is_encodable(term.as_bytes())
    }
}

impl<S: Into<String>> Extend<S> for DictionaryWriter {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.terms.extend(iter.into_iter().map(Into::into));
    }
}
