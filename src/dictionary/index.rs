// --- File: src/dictionary/index.rs
use crate::dictionary::codec::{
    self, byte_at, prefix2_key, prefix3_key, read_bucket, read_u32_le, write_bucket,
    write_u32_le, TermStreamReader, BLOCK_BYTES, BLOCK_HEADER_BYTES, BUCKET_BYTES, NO_ENTRY,
    PREFIX2_BUCKETS, REFINEMENT_THRESHOLD, SEPARATOR, TABLE_ENTRIES,
};
use crate::dictionary::Dictionary;
use crate::error::DictionaryError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Read;

type Bucket = (u32, u32);

/// The four derived byte buffers of a dictionary, exactly as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryParts {
    /// All terms, each followed by `SEPARATOR`.
    pub blob: Vec<u8>,
    /// One `u32` byte offset into `blob` per term.
    pub index: Vec<u8>,
    /// 65,536 dense `(low, high)` buckets keyed by the first two bytes.
    pub prefix2: Vec<u8>,
    /// Sparse `[level][key][256 buckets]` refinement blocks.
    pub prefix34: Vec<u8>,
}

// --- IndexBuilder: derives the lookup structures while terms stream in ---

/// Accumulates terms in sorted order and produces `DictionaryParts`.
#[derive(Default)]
pub struct IndexBuilder {
    blob: Vec<u8>,
    index: Vec<u8>,
    count: u32,
    prefix2: BTreeMap<u16, Bucket>,
    prefix3: BTreeMap<u16, BTreeMap<u8, Bucket>>,
    prefix4: BTreeMap<u32, BTreeMap<u8, Bucket>>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Appends the next term. Terms must arrive in byte order.
    /// O(k) complexity where k is term length.
    pub fn push(&mut self, term: &[u8]) -> Result<(), DictionaryError> {
        let offset = u32::try_from(self.blob.len())
            .ok()
            .filter(|_| self.count < NO_ENTRY - 1)
            .ok_or_else(|| {
                DictionaryError::CorruptArchive("dictionary exceeds the 32-bit index".to_string())
            })?;

        let position = self.count;
        write_u32_le(&mut self.index, offset);
        self.blob.extend_from_slice(term);
        self.blob.push(SEPARATOR);

        let key2 = prefix2_key(term);
        extend(self.prefix2.entry(key2), position);
        extend(
            self.prefix3.entry(key2).or_default().entry(byte_at(term, 2)),
            position,
        );
        extend(
            self.prefix4
                .entry(prefix3_key(term))
                .or_default()
                .entry(byte_at(term, 3)),
            position,
        );

        self.count += 1;
        Ok(())
    }

    pub fn finish(self) -> DictionaryParts {
        let mut prefix2 = Vec::with_capacity(PREFIX2_BUCKETS * BUCKET_BYTES);
        for key in 0..PREFIX2_BUCKETS {
            write_bucket(&mut prefix2, self.prefix2.get(&(key as u16)).copied());
        }

        // Level 3 blocks split oversized 2-byte buckets by the 3rd byte,
        // level 4 blocks split oversized 3-byte buckets by the 4th byte.
        let mut prefix34 = Vec::new();
        let oversized = |&(low, high): &Bucket| high - low + 1 >= REFINEMENT_THRESHOLD;

        for (&key2, bucket) in &self.prefix2 {
            if !oversized(bucket) {
                continue;
            }
            let empty = BTreeMap::new();
            let refinement = self.prefix3.get(&key2).unwrap_or(&empty);
            write_block(&mut prefix34, 3, u32::from(key2), refinement);
        }

        for (&key2, by_byte2) in &self.prefix3 {
            if !self.prefix2.get(&key2).is_some_and(oversized) {
                continue;
            }
            for (&byte2, bucket) in by_byte2 {
                if !oversized(bucket) {
                    continue;
                }
                let key3 = u32::from(key2) << 8 | u32::from(byte2);
                let empty = BTreeMap::new();
                let refinement = self.prefix4.get(&key3).unwrap_or(&empty);
                write_block(&mut prefix34, 4, key3, refinement);
            }
        }

        DictionaryParts {
            blob: self.blob,
            index: self.index,
            prefix2,
            prefix34,
        }
    }
}

fn extend<K: Ord>(entry: std::collections::btree_map::Entry<'_, K, Bucket>, position: u32) {
    entry
        .and_modify(|(_, high)| *high = position)
        .or_insert((position, position));
}

fn write_block(out: &mut Vec<u8>, level: u8, key: u32, ranges: &BTreeMap<u8, Bucket>) {
    out.push(level);
    write_u32_le(out, key);
    for byte in 0..TABLE_ENTRIES {
        write_bucket(out, ranges.get(&(byte as u8)).copied());
    }
}

// --- BinaryDictionary: read-only, validated lookup structure ---

/// A sorted term set answering `has` with a dense bucket jump, optional
/// refinement and a short binary search.
pub struct BinaryDictionary {
    blob: Vec<u8>,
    index: Vec<u8>,
    count: usize,
    prefix2: Vec<u8>,
    prefix34: Vec<u8>,
    /// key2 -> byte offset of its level 3 table inside `prefix34`.
    level3: HashMap<u16, usize>,
    /// key3 -> byte offset of its level 4 table inside `prefix34`.
    level4: HashMap<u32, usize>,
}

impl BinaryDictionary {
    /// Builds a dictionary in memory from an arbitrary-order term collection.
    /// Duplicates are removed; terms the format cannot store are skipped.
    pub fn from_terms<I, S>(terms: I) -> Result<Self, DictionaryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        terms.sort_unstable();
        terms.dedup();

        let mut builder = IndexBuilder::new();
        for term in terms.iter().filter(|t| codec::is_encodable(t.as_bytes())) {
            builder.push(term.as_bytes())?;
        }
        Self::from_parts(builder.finish())
    }

    /// Decodes a compressed prefix-delta archive into lookup structures.
    pub fn decode_archive<R: Read>(reader: R) -> Result<DictionaryParts, DictionaryError> {
        let mut stream = TermStreamReader::from_archive(reader);
        let mut builder = IndexBuilder::new();
        while let Some(term) = stream.next_term()? {
            builder.push(term)?;
        }
        Ok(builder.finish())
    }

    /// Validates derived buffers against each other and takes ownership.
    /// Every offset and bucket is checked once here so lookups can trust them.
    pub fn from_parts(parts: DictionaryParts) -> Result<Self, DictionaryError> {
        let DictionaryParts {
            blob,
            index,
            prefix2,
            prefix34,
        } = parts;

        let count = validate_index(&blob, &index)?;

        if prefix2.len() != PREFIX2_BUCKETS * BUCKET_BYTES {
            return Err(corrupt(
                "prefix_buckets_2",
                format!(
                    "expected {} bytes, found {}",
                    PREFIX2_BUCKETS * BUCKET_BYTES,
                    prefix2.len()
                ),
            ));
        }
        validate_buckets("prefix_buckets_2", &prefix2, count)?;

        let (level3, level4) = index_refinements(&prefix34, count)?;

        Ok(Self {
            blob,
            index,
            count,
            prefix2,
            prefix34,
            level3,
            level4,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Term at sorted position `position`, without its separator.
    /// O(1) complexity thanks to the flat offset index.
    pub fn term_at(&self, position: usize) -> Option<&[u8]> {
        if position >= self.count {
            return None;
        }
        let start = read_u32_le(&self.index, position * 4)? as usize;
        let end = if position + 1 < self.count {
            read_u32_le(&self.index, (position + 1) * 4)? as usize
        } else {
            self.blob.len()
        };
        self.blob.get(start..end.checked_sub(1)?)
    }

    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    pub fn index_bytes(&self) -> &[u8] {
        &self.index
    }

    pub fn prefix2_bytes(&self) -> &[u8] {
        &self.prefix2
    }

    pub fn prefix34_bytes(&self) -> &[u8] {
        &self.prefix34
    }

    /// Exact byte-string membership.
    /// O(1) bucket jump plus O(log b) comparisons, b being the bucket size.
    pub fn contains_bytes(&self, term: &[u8]) -> bool {
        let key2 = prefix2_key(term);
        let Some(bucket) = read_bucket(&self.prefix2, usize::from(key2) * BUCKET_BYTES) else {
            return false;
        };
        let Some((low, high)) = self.refine(term, key2, bucket) else {
            return false;
        };
        self.binary_search(term, low as usize, high as usize)
    }

    /// Narrows an oversized bucket by the 3rd and then the 4th byte.
    /// `None` means a refinement table proves the term absent.
    fn refine(&self, term: &[u8], key2: u16, bucket: Bucket) -> Option<Bucket> {
        let mut bucket = bucket;
        if size(bucket) <= REFINEMENT_THRESHOLD {
            return Some(bucket);
        }

        if let Some(&table) = self.level3.get(&key2) {
            bucket = self.table_entry(table, byte_at(term, 2))?;
        }
        if size(bucket) <= REFINEMENT_THRESHOLD {
            return Some(bucket);
        }

        if let Some(&table) = self.level4.get(&prefix3_key(term)) {
            bucket = self.table_entry(table, byte_at(term, 3))?;
        }
        Some(bucket)
    }

    fn table_entry(&self, table: usize, byte: u8) -> Option<Bucket> {
        read_bucket(&self.prefix34, table + usize::from(byte) * BUCKET_BYTES)
    }

    fn binary_search(&self, term: &[u8], low: usize, high: usize) -> bool {
        // Half-open [low, end) over the inclusive bucket.
        let (mut low, mut end) = (low, high + 1);
        while low < end {
            let mid = low + (end - low) / 2;
            let Some(candidate) = self.term_at(mid) else {
                return false;
            };
            match term.cmp(candidate) {
                std::cmp::Ordering::Equal => return true,
                std::cmp::Ordering::Less => end = mid,
                std::cmp::Ordering::Greater => low = mid + 1,
            }
        }
        false
    }
}

impl Dictionary for BinaryDictionary {
    fn has(&self, term: &str) -> bool {
        self.contains_bytes(term.as_bytes())
    }
}

impl fmt::Debug for BinaryDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryDictionary")
            .field("terms", &self.count)
            .field("blob_bytes", &self.blob.len())
            .field("level3_tables", &self.level3.len())
            .field("level4_tables", &self.level4.len())
            .finish()
    }
}

fn size((low, high): Bucket) -> u32 {
    high - low + 1
}

fn corrupt(file: &'static str, reason: String) -> DictionaryError {
    DictionaryError::CorruptIndex { file, reason }
}

/// Offsets must start at zero, increase strictly, and each term must end
/// with a separator right before the next offset.
fn validate_index(blob: &[u8], index: &[u8]) -> Result<usize, DictionaryError> {
    if index.len() % 4 != 0 {
        return Err(corrupt("index", format!("length {} is not a multiple of 4", index.len())));
    }
    let count = index.len() / 4;
    if count as u64 >= u64::from(NO_ENTRY) {
        return Err(corrupt("index", format!("{count} terms exceed the 32-bit index")));
    }
    if count == 0 {
        if !blob.is_empty() {
            return Err(corrupt("terms", "blob is not empty but the index is".to_string()));
        }
        return Ok(0);
    }
    if blob.last() != Some(&SEPARATOR) {
        return Err(corrupt("terms", "blob does not end with a separator".to_string()));
    }

    let mut previous: Option<usize> = None;
    for position in 0..count {
        let offset = read_u32_le(index, position * 4)
            .map(|o| o as usize)
            .ok_or_else(|| corrupt("index", format!("unreadable offset {position}")))?;

        let well_formed = match previous {
            None => offset == 0,
            Some(prev) => offset > prev + 1 && blob.get(offset - 1) == Some(&SEPARATOR),
        };
        if !well_formed || offset >= blob.len() {
            return Err(corrupt(
                "index",
                format!("offset {offset} of term {position} does not match the blob"),
            ));
        }
        previous = Some(offset);
    }
    Ok(count)
}

fn validate_buckets(file: &'static str, buf: &[u8], count: usize) -> Result<(), DictionaryError> {
    for offset in (0..buf.len()).step_by(BUCKET_BYTES) {
        if let Some((low, high)) = read_bucket(buf, offset) {
            if low > high || high as usize >= count {
                return Err(corrupt(
                    file,
                    format!("bucket [{low}, {high}] at byte {offset} is outside {count} terms"),
                ));
            }
        }
    }
    Ok(())
}

#[allow(clippy::type_complexity)]
fn index_refinements(
    prefix34: &[u8],
    count: usize,
) -> Result<(HashMap<u16, usize>, HashMap<u32, usize>), DictionaryError> {
    const FILE: &str = "prefix_buckets_34";

    if prefix34.len() % BLOCK_BYTES != 0 {
        return Err(corrupt(
            FILE,
            format!("length {} is not a whole number of blocks", prefix34.len()),
        ));
    }

    let mut level3 = HashMap::new();
    let mut level4 = HashMap::new();
    for block in (0..prefix34.len()).step_by(BLOCK_BYTES) {
        let key = read_u32_le(prefix34, block + 1)
            .ok_or_else(|| corrupt(FILE, format!("unreadable key at byte {block}")))?;
        let table = block + BLOCK_HEADER_BYTES;
        validate_buckets(FILE, &prefix34[table..block + BLOCK_BYTES], count)?;

        match prefix34[block] {
            3 => {
                level3.insert((key & 0xFFFF) as u16, table);
            }
            4 => {
                level4.insert(key & 0xFF_FFFF, table);
            }
            level => {
                return Err(corrupt(
                    FILE,
                    format!("unknown refinement level {level} at byte {block}"),
                ));
            }
        }
    }
    Ok((level3, level4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn random_word(rng: &mut StdRng) -> String {
        let len = rng.gen_range(1..=12);
        (0..len).map(|_| rng.gen_range(b'a'..=b'f') as char).collect()
    }

    fn refined_dictionary() -> BinaryDictionary {
        let mut terms: Vec<String> = (0..1500).map(|i| format!("sch{i:04}")).collect();
        terms.extend(["sch", "sca", "scz", "schule", "dampf"].map(String::from));
        BinaryDictionary::from_terms(terms).unwrap()
    }

    #[test]
    fn finds_exactly_the_source_terms() {
        let mut rng = StdRng::seed_from_u64(0x5eed_1234_abcd_ef01);
        let source: HashSet<String> = (0..3000).map(|_| random_word(&mut rng)).collect();
        let dictionary = BinaryDictionary::from_terms(source.iter().cloned()).unwrap();

        assert_eq!(dictionary.len(), source.len());
        for term in &source {
            assert!(dictionary.has(term), "missing {term}");
        }
        for _ in 0..5000 {
            let word = random_word(&mut rng);
            assert_eq!(dictionary.has(&word), source.contains(&word), "lookup {word}");
        }
    }

    #[test]
    fn archive_decode_matches_in_memory_build() {
        let terms = ["donau", "dampf", "schiff", "fahrt", "gesell", "schaft", "kapitan"];
        let mut sorted: Vec<&[u8]> = terms.iter().map(|t| t.as_bytes()).collect();
        sorted.sort_unstable();

        let mut archive = Vec::new();
        codec::encode_archive(sorted, &mut archive).unwrap();

        let decoded = BinaryDictionary::decode_archive(archive.as_slice()).unwrap();
        let built = BinaryDictionary::from_terms(terms).unwrap();
        assert_eq!(&decoded.blob, built.blob());
        assert_eq!(&decoded.index, built.index_bytes());
        assert_eq!(&decoded.prefix2, built.prefix2_bytes());
    }

    #[test]
    fn terms_are_readable_by_position() {
        let dictionary =
            BinaryDictionary::from_terms(["schiff", "dampf", "fahrt", "dampf"]).unwrap();
        assert_eq!(dictionary.len(), 3);
        assert_eq!(dictionary.term_at(0), Some(&b"dampf"[..]));
        assert_eq!(dictionary.term_at(1), Some(&b"fahrt"[..]));
        assert_eq!(dictionary.term_at(2), Some(&b"schiff"[..]));
        assert_eq!(dictionary.term_at(3), None);
    }

    #[test]
    fn single_byte_and_multibyte_terms() {
        let dictionary = BinaryDictionary::from_terms(["a", "ab", "kapitän", "ä"]).unwrap();
        assert!(dictionary.has("a"));
        assert!(dictionary.has("ab"));
        assert!(dictionary.has("ä"));
        assert!(dictionary.has("kapitän"));
        assert!(!dictionary.has("kapitan"));
        assert!(!dictionary.has(""));
        assert!(!dictionary.has("b"));
    }

    #[test]
    fn large_buckets_get_refinement_blocks() {
        let dictionary = refined_dictionary();
        // One level 3 block for "sc", one level 4 block for "sch".
        assert_eq!(dictionary.prefix34_bytes().len(), 2 * BLOCK_BYTES);
        assert_eq!(dictionary.level3.len(), 1);
        assert_eq!(dictionary.level4.len(), 1);
    }

    #[test]
    fn refined_lookup_hits_and_misses() {
        let dictionary = refined_dictionary();
        let present = [
            "sch0000", "sch0999", "sch1000", "sch1499", "sch", "sca", "scz", "schule", "dampf",
        ];
        for term in present {
            assert!(dictionary.has(term), "missing {term}");
        }
        // 3rd byte without a level 3 entry, 4th byte without a level 4 entry.
        for term in ["scb", "sch2000", "sch1500", "schul", "sc"] {
            assert!(!dictionary.has(term), "unexpected {term}");
        }
    }

    #[test]
    fn empty_dictionary_has_nothing() {
        let dictionary = BinaryDictionary::from_terms(Vec::<String>::new()).unwrap();
        assert!(dictionary.is_empty());
        assert!(!dictionary.has("dampf"));
    }

    #[test]
    fn rejects_inconsistent_parts() {
        let parts = IndexBuilder::new().finish();

        let mut short_buckets = parts.clone();
        short_buckets.prefix2.truncate(16);
        assert!(matches!(
            BinaryDictionary::from_parts(short_buckets),
            Err(DictionaryError::CorruptIndex { file: "prefix_buckets_2", .. })
        ));

        let mut odd_index = parts.clone();
        odd_index.index = vec![0, 0, 0];
        assert!(matches!(
            BinaryDictionary::from_parts(odd_index),
            Err(DictionaryError::CorruptIndex { file: "index", .. })
        ));

        let mut torn_block = parts;
        torn_block.prefix34 = vec![3, 0, 0];
        assert!(matches!(
            BinaryDictionary::from_parts(torn_block),
            Err(DictionaryError::CorruptIndex { file: "prefix_buckets_34", .. })
        ));
    }

    #[test]
    fn rejects_buckets_pointing_past_the_index() {
        let mut builder = IndexBuilder::new();
        builder.push(b"dampf").unwrap();
        let mut parts = builder.finish();

        // Claim a second term that does not exist.
        let key = usize::from(prefix2_key(b"da")) * BUCKET_BYTES;
        parts.prefix2[key + 4..key + 8].copy_from_slice(&1u32.to_le_bytes());
        assert!(matches!(
            BinaryDictionary::from_parts(parts),
            Err(DictionaryError::CorruptIndex { file: "prefix_buckets_2", .. })
        ));
    }
}
