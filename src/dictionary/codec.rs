// File: src/dictionary/codec.rs
//! Byte-level building blocks of the dictionary format.
//!
//! The source archive is a gzip stream of records
//! `[prefix_len: u8][suffix_len: u8][suffix bytes]`, one per term in byte
//! order, where `prefix_len` is the number of leading bytes shared with the
//! previous term. Every derived file stores integers as little-endian `u32`.

use crate::error::DictionaryError;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Read, Write};

/// Longest storable term. The suffix length has to fit a single byte.
pub const MAX_TERM_BYTES: usize = 255;

/// Terminates every term inside the term blob.
pub const SEPARATOR: u8 = b'\n';

/// Marks an empty bucket. Term indices are always smaller than this.
pub const NO_ENTRY: u32 = u32::MAX;

/// Buckets larger than this get narrowed by the 3rd and 4th byte.
pub const REFINEMENT_THRESHOLD: u32 = 512;

/// One dense bucket per possible first-two-byte combination.
pub const PREFIX2_BUCKETS: usize = 1 << 16;

/// A bucket is `(low: u32, high: u32)`.
pub const BUCKET_BYTES: usize = 8;

pub const TABLE_ENTRIES: usize = 256;

/// `[level: u8][key: u32]`
pub const BLOCK_HEADER_BYTES: usize = 5;

pub const BLOCK_BYTES: usize = BLOCK_HEADER_BYTES + TABLE_ENTRIES * BUCKET_BYTES;

pub fn read_u32_le(buf: &[u8], offset: usize) -> Option<u32> {
    let bytes = buf.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

pub fn write_u32_le(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Reads the inclusive `(low, high)` bucket at `offset`.
/// Returns `None` for empty buckets and for reads past the buffer.
pub fn read_bucket(buf: &[u8], offset: usize) -> Option<(u32, u32)> {
    let low = read_u32_le(buf, offset)?;
    if low == NO_ENTRY {
        return None;
    }
    let high = read_u32_le(buf, offset + 4)?;
    Some((low, high))
}

pub fn write_bucket(out: &mut Vec<u8>, bucket: Option<(u32, u32)>) {
    let (low, high) = bucket.unwrap_or((NO_ENTRY, NO_ENTRY));
    write_u32_le(out, low);
    write_u32_le(out, high);
}

/// Missing bytes count as `0`, so short terms still land in a bucket.
pub fn byte_at(term: &[u8], position: usize) -> u8 {
    term.get(position).copied().unwrap_or(0)
}

pub fn prefix2_key(term: &[u8]) -> u16 {
    u16::from(byte_at(term, 0)) << 8 | u16::from(byte_at(term, 1))
}

pub fn prefix3_key(term: &[u8]) -> u32 {
    u32::from(prefix2_key(term)) << 8 | u32::from(byte_at(term, 2))
}

pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Whether a term can be represented in the format at all.
pub fn is_encodable(term: &[u8]) -> bool {
    !term.is_empty() && term.len() <= MAX_TERM_BYTES && !term.contains(&SEPARATOR)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Writes prefix-delta records for `terms`, which must already be sorted
/// by bytes and unique. Terms the format cannot hold are skipped.
pub fn encode_terms<'a, I, W>(terms: I, out: &mut W) -> io::Result<EncodeSummary>
where
    I: IntoIterator<Item = &'a [u8]>,
    W: Write,
{
    let mut summary = EncodeSummary::default();
    let mut previous: &[u8] = &[];

    for term in terms {
        if !is_encodable(term) {
            summary.skipped += 1;
            continue;
        }
        debug_assert!(previous < term, "terms must be sorted and unique");

        let prefix_len = common_prefix_len(previous, term);
        let suffix = &term[prefix_len..];

        // Both fit a byte: prefix_len <= suffix end <= MAX_TERM_BYTES.
        out.write_all(&[prefix_len as u8, suffix.len() as u8])?;
        out.write_all(suffix)?;

        summary.written += 1;
        previous = term;
    }

    Ok(summary)
}

/// Compresses the record stream at maximum ratio.
pub fn encode_archive<'a, I, W>(terms: I, out: W) -> io::Result<EncodeSummary>
where
    I: IntoIterator<Item = &'a [u8]>,
    W: Write,
{
    let mut encoder = GzEncoder::new(out, Compression::best());
    let summary = encode_terms(terms, &mut encoder)?;
    encoder.finish()?;
    Ok(summary)
}

/// Sequential decoder for the record stream.
pub struct TermStreamReader<R> {
    reader: R,
    previous: Vec<u8>,
    decoded: usize,
}

impl<R: Read> TermStreamReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            previous: Vec::with_capacity(MAX_TERM_BYTES),
            decoded: 0,
        }
    }

    pub fn decoded(&self) -> usize {
        self.decoded
    }

    /// Returns the next term, or `None` at a clean end of stream.
    ///
    /// A stream ending inside a record, a prefix longer than the previous
    /// term, or terms out of byte order are reported as corruption.
    pub fn next_term(&mut self) -> Result<Option<&[u8]>, DictionaryError> {
        let Some([prefix_len, suffix_len]) = self.read_header()? else {
            return Ok(None);
        };
        let (prefix_len, suffix_len) = (usize::from(prefix_len), usize::from(suffix_len));

        if prefix_len > self.previous.len() {
            return Err(DictionaryError::CorruptArchive(format!(
                "record {} shares {} bytes with a {}-byte predecessor",
                self.decoded,
                prefix_len,
                self.previous.len()
            )));
        }

        let mut term = Vec::with_capacity(prefix_len + suffix_len);
        term.extend_from_slice(&self.previous[..prefix_len]);
        term.resize(prefix_len + suffix_len, 0);
        self.reader
            .read_exact(&mut term[prefix_len..])
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => DictionaryError::CorruptArchive(format!(
                    "record {} expected {} suffix bytes",
                    self.decoded, suffix_len
                )),
                _ => stream_error(e),
            })?;

        if !is_encodable(&term) {
            return Err(DictionaryError::CorruptArchive(format!(
                "record {} decodes to an unstorable term",
                self.decoded
            )));
        }
        if self.decoded > 0 && term <= self.previous {
            return Err(DictionaryError::CorruptArchive(format!(
                "record {} is out of byte order",
                self.decoded
            )));
        }

        self.previous = term;
        self.decoded += 1;
        Ok(Some(&self.previous))
    }

    fn read_header(&mut self) -> Result<Option<[u8; 2]>, DictionaryError> {
        let mut header = [0u8; 2];
        let mut filled = 0;
        while filled < header.len() {
            match self.reader.read(&mut header[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(stream_error(e)),
            }
        }

        match filled {
            0 => Ok(None),
            2 => Ok(Some(header)),
            _ => Err(DictionaryError::CorruptArchive(format!(
                "record {} has a truncated header",
                self.decoded
            ))),
        }
    }
}

impl<R: Read> TermStreamReader<GzDecoder<R>> {
    pub fn from_archive(reader: R) -> Self {
        Self::new(GzDecoder::new(reader))
    }
}

// gzip reports a damaged stream as InvalidInput/InvalidData.
fn stream_error(e: io::Error) -> DictionaryError {
    match e.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => {
            DictionaryError::CorruptArchive(e.to_string())
        }
        _ => DictionaryError::Io(e),
    }
}
