// File: src/persistence.rs
//! On-disk layout of one locale's dictionary directory.
//!
//! `dictionary.gz` is the only canonical artifact. The other files are
//! derived from it on first load and cached next to it so later process
//! starts can skip decoding. They are rebuilt whenever they are missing,
//! fail validation, or were derived from a different archive.
use crate::dictionary::codec::{self, EncodeSummary};
use crate::dictionary::index::{BinaryDictionary, DictionaryParts};
use crate::error::DictionaryError;
use flate2::Crc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub const ARCHIVE_FILE: &str = "dictionary.gz";
pub const TERMS_FILE: &str = "terms";
pub const INDEX_FILE: &str = "index";
pub const PREFIX2_FILE: &str = "prefix_buckets_2";
pub const PREFIX34_FILE: &str = "prefix_buckets_34";
pub const MANIFEST_FILE: &str = "manifest.bin";

const FORMAT_VERSION: u32 = 1;

/// Identifies the archive the derived files were produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct ArchiveFingerprint {
    len: u64,
    crc: u32,
}

impl ArchiveFingerprint {
    fn of(archive: &[u8]) -> Self {
        let mut crc = Crc::new();
        crc.update(archive);
        Self {
            len: archive.len() as u64,
            crc: crc.sum(),
        }
    }
}

/// Written last, so a torn regeneration never looks current.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheManifest {
    format_version: u32,
    archive: ArchiveFingerprint,
    term_count: u64,
    blob_len: u64,
}

impl CacheManifest {
    fn describes(&self, archive: &ArchiveFingerprint, parts: &DictionaryParts) -> bool {
        self.format_version == FORMAT_VERSION
            && self.archive == *archive
            && self.term_count == (parts.index.len() / 4) as u64
            && self.blob_len == parts.blob.len() as u64
    }
}

/// Writes `sorted_terms` as the compressed source archive of `dir`.
/// Terms must be unique and sorted by bytes.
pub fn write_archive<S: AsRef<str>>(
    dir: &Path,
    sorted_terms: &[S],
) -> Result<EncodeSummary, DictionaryError> {
    if !dir.is_dir() {
        return Err(DictionaryError::NotADirectory(dir.to_path_buf()));
    }

    let mut archive = Vec::new();
    let summary = codec::encode_archive(
        sorted_terms.iter().map(|t| t.as_ref().as_bytes()),
        &mut archive,
    )?;
    persist_atomically(dir, ARCHIVE_FILE, &archive)?;

    info!(
        dir = %dir.display(),
        written = summary.written,
        skipped = summary.skipped,
        bytes = archive.len(),
        "wrote dictionary archive"
    );
    Ok(summary)
}

/// Loads the dictionary of `dir`, regenerating derived files if needed.
///
/// A missing or corrupt archive is fatal whenever the derived files cannot
/// be used; there is no fallback to an empty dictionary.
pub fn load_dictionary(dir: &Path) -> Result<BinaryDictionary, DictionaryError> {
    if !dir.is_dir() {
        return Err(DictionaryError::NotADirectory(dir.to_path_buf()));
    }

    let archive_path = dir.join(ARCHIVE_FILE);
    let archive = read_optional(&archive_path)?;
    let fingerprint = archive.as_deref().map(ArchiveFingerprint::of);

    match read_cached(dir, fingerprint.as_ref()) {
        Ok(Some(dictionary)) => {
            debug!(dir = %dir.display(), terms = dictionary.len(), "using cached dictionary index");
            return Ok(dictionary);
        }
        Ok(None) => debug!(dir = %dir.display(), "dictionary index missing or stale"),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "dictionary index unreadable, rebuilding")
        }
    }

    let (Some(archive), Some(fingerprint)) = (archive, fingerprint) else {
        return Err(DictionaryError::ArchiveNotFound(archive_path));
    };

    let parts = BinaryDictionary::decode_archive(archive.as_slice())?;
    let dictionary = BinaryDictionary::from_parts(parts)?;
    info!(dir = %dir.display(), terms = dictionary.len(), "decoded dictionary archive");

    // Non-fatal: the in-memory index is already complete.
    if let Err(e) = write_cached(dir, &dictionary, fingerprint) {
        warn!(dir = %dir.display(), error = %e, "could not cache dictionary index");
    }

    Ok(dictionary)
}

fn read_cached(
    dir: &Path,
    fingerprint: Option<&ArchiveFingerprint>,
) -> Result<Option<BinaryDictionary>, DictionaryError> {
    let (Some(blob), Some(index), Some(prefix2)) = (
        read_optional(&dir.join(TERMS_FILE))?,
        read_optional(&dir.join(INDEX_FILE))?,
        read_optional(&dir.join(PREFIX2_FILE))?,
    ) else {
        return Ok(None);
    };
    // Dictionaries too small to need refinement may lack this file.
    let prefix34 = read_optional(&dir.join(PREFIX34_FILE))?.unwrap_or_default();

    let parts = DictionaryParts {
        blob,
        index,
        prefix2,
        prefix34,
    };

    // Without an archive there is nothing to be stale against.
    if let Some(fingerprint) = fingerprint {
        let Some(manifest) = read_optional(&dir.join(MANIFEST_FILE))? else {
            return Ok(None);
        };
        let manifest: CacheManifest = bincode::deserialize(&manifest)?;
        if !manifest.describes(fingerprint, &parts) {
            return Ok(None);
        }
    }

    BinaryDictionary::from_parts(parts).map(Some)
}

fn write_cached(
    dir: &Path,
    dictionary: &BinaryDictionary,
    archive: ArchiveFingerprint,
) -> Result<(), DictionaryError> {
    persist_atomically(dir, TERMS_FILE, dictionary.blob())?;
    persist_atomically(dir, INDEX_FILE, dictionary.index_bytes())?;
    persist_atomically(dir, PREFIX2_FILE, dictionary.prefix2_bytes())?;
    persist_atomically(dir, PREFIX34_FILE, dictionary.prefix34_bytes())?;

    let manifest = CacheManifest {
        format_version: FORMAT_VERSION,
        archive,
        term_count: dictionary.len() as u64,
        blob_len: dictionary.blob().len() as u64,
    };
    persist_atomically(dir, MANIFEST_FILE, &bincode::serialize(&manifest)?)?;
    Ok(())
}

fn read_optional(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Readers never observe a half-written file: write a sibling temp file,
/// then rename it over the target.
fn persist_atomically(dir: &Path, name: &str, bytes: &[u8]) -> io::Result<()> {
    let mut temp_file = NamedTempFile::new_in(dir)?;
    temp_file.write_all(bytes)?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(dir.join(name))?;
    Ok(())
}
