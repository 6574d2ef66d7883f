// File: src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while writing, decoding or loading a dictionary.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("dictionary archive not found: {0}")]
    ArchiveNotFound(PathBuf),

    /// The prefix-delta stream inside the archive is malformed.
    #[error("corrupt dictionary archive: {0}")]
    CorruptArchive(String),

    /// A derived file does not match the layout it claims to have.
    #[error("corrupt derived file '{file}': {reason}")]
    CorruptIndex { file: &'static str, reason: String },

    #[error("manifest error: {0}")]
    Manifest(#[from] bincode::Error),
}

/// Errors raised while building a decomposition configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("allow list term {term:?} has length {length}, terms must be shorter than {minimum}")]
    AllowListTermTooLong {
        term: String,
        length: usize,
        minimum: usize,
    },

    #[error("interfixes must not be empty strings")]
    EmptyInterfix,

    #[error("unknown locale: {0}")]
    UnknownLocale(String),

    #[error("invalid locale policy: {0}")]
    Policy(#[from] serde_json::Error),
}

/// Top-level error for locale wiring, which both loads a dictionary and
/// validates a configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
