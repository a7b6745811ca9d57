//! Perfect-hash word index over the database
//!
//! Every word of `word_size` bases over {A,C,G,T} packs into a `u32` at 2 bits per base
//! (A=0, C=1, G=2, T=3, case-insensitive), so the index is addressed directly by the
//! packed value. Words with any other symbol are never indexed and never found.

use crate::config::{HashConfig, MAX_WORD_SIZE};
use crate::error::SearchError;
use crate::sequence::NamedSequence;
use anyhow::Result;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// Sequence ids are 16-bit, so this is the largest indexable database
pub const MAX_SEQUENCES: usize = u16::MAX as usize;

/// Low-complexity threshold never drops below this occurrence count
pub const MIN_LOW_COMPLEXITY_THRESHOLD: f64 = 5.0;

/// Word sizes up to this use a direct-address table (4^12 offsets); larger ones a hash map
pub const MAX_DIRECT_WORD_SIZE: usize = 12;

#[inline(always)]
fn base_code(base: u8) -> Option<u32> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Pack the word at `seq[start..start + word_size]`, or `None` if it is out of range,
/// longer than [`MAX_WORD_SIZE`] or contains a non-ACGT symbol
#[inline]
pub fn hash_word(seq: &[u8], start: usize, word_size: usize) -> Option<u32> {
    if word_size == 0 || word_size > MAX_WORD_SIZE || start + word_size > seq.len() {
        return None;
    }
    let mut code = 0u32;
    for &b in &seq[start..start + word_size] {
        code = (code << 2) | base_code(b)?;
    }
    Some(code)
}

/// Unpack a hash value back into upper-case bases
pub fn unhash_word(code: u32, word_size: usize) -> Vec<u8> {
    let mut word = vec![0u8; word_size];
    let mut c = code;
    for i in (0..word_size).rev() {
        word[i] = b"ACGT"[(c & 3) as usize];
        c >>= 2;
    }
    word
}

/// Rolling iterator over every hashable word of a sequence, yielding `(position, hash)`
pub struct Words<'a> {
    seq: &'a [u8],
    word_size: usize,
    mask: u32,
    code: u32,
    valid: usize,
    pos: usize,
}

impl<'a> Words<'a> {
    pub fn new(seq: &'a [u8], word_size: usize) -> Self {
        let usable = word_size > 0 && word_size <= MAX_WORD_SIZE;
        Self {
            // An unusable word size yields nothing
            seq: if usable { seq } else { &[] },
            word_size,
            mask: ((1u64 << (2 * word_size.min(MAX_WORD_SIZE))) - 1) as u32,
            code: 0,
            valid: 0,
            pos: 0,
        }
    }
}

impl Iterator for Words<'_> {
    type Item = (usize, u32);

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.seq.len() {
            let b = self.seq[self.pos];
            self.pos += 1;
            match base_code(b) {
                Some(c) => {
                    self.code = ((self.code << 2) | c) & self.mask;
                    self.valid += 1;
                    if self.valid >= self.word_size {
                        return Some((self.pos - self.word_size, self.code));
                    }
                }
                None => {
                    self.valid = 0;
                    self.code = 0;
                }
            }
        }
        None
    }
}

/// One recorded occurrence of a word in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Occurrence {
    pub sequence_id: u16,
    /// 0-based start of the word
    pub position: u32,
}

/// Word length and sampling step of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordGeometry {
    pub word_size: usize,
    pub step_size: usize,
}

#[derive(Debug)]
enum Buckets {
    /// Offsets into `hits` for each of the 4^k words; an empty range means absent
    Direct { offsets: Vec<u32>, hits: Vec<Occurrence> },
    Sparse(FxHashMap<u32, Box<[Occurrence]>>),
}

/// Immutable word index, built once per database and shared read-only by all queries
#[derive(Debug)]
pub struct HashIndex {
    geometry: WordGeometry,
    buckets: Buckets,
    num_words: usize,
    num_masked: usize,
    num_sequences: usize,
    total_occurrences: usize,
}

impl HashIndex {
    pub fn build(sequences: &[NamedSequence], config: &HashConfig) -> Result<Self> {
        config.validate()?;
        if sequences.len() > MAX_SEQUENCES {
            return Err(SearchError::TooManySequences {
                count: sequences.len(),
                max: MAX_SEQUENCES,
            }
            .into());
        }

        let word_size = config.word_size;
        let step_size = config.step_size();
        let mut table: FxHashMap<u32, Vec<Occurrence>> = FxHashMap::default();
        let mut total_bases = 0usize;

        for (id, seq) in sequences.iter().enumerate() {
            let bytes = seq.as_bytes();
            if bytes.len() < word_size {
                continue;
            }
            total_bases += bytes.len();
            let sequence_id = id as u16;

            let mut pos = 0;
            while pos + word_size <= bytes.len() {
                if let Some(code) = hash_word(bytes, pos, word_size) {
                    table.entry(code).or_default().push(Occurrence {
                        sequence_id,
                        position: pos as u32,
                    });
                }
                pos += step_size;
            }
        }

        let mut num_masked = 0usize;
        if let Some(cutoff) = config.low_complexity_cutoff {
            let expected = total_bases as f64 / 4f64.powi(word_size as i32);
            let threshold = (expected * cutoff).max(MIN_LOW_COMPLEXITY_THRESHOLD);
            table.retain(|_, occurrences| {
                let keep = (occurrences.len() as f64) < threshold;
                if !keep {
                    num_masked += 1;
                }
                keep
            });
            debug!(expected, threshold, num_masked, "low-complexity masking");
        }

        let num_words = table.len();
        let total_occurrences: usize = table.values().map(Vec::len).sum();
        let buckets = if word_size <= MAX_DIRECT_WORD_SIZE && total_occurrences <= u32::MAX as usize {
            Self::direct_buckets(table, word_size, total_occurrences)
        } else {
            Buckets::Sparse(
                table
                    .into_iter()
                    .map(|(code, occurrences)| (code, occurrences.into_boxed_slice()))
                    .collect(),
            )
        };

        info!(
            sequences = sequences.len(),
            word_size,
            step_size,
            words = num_words,
            occurrences = total_occurrences,
            masked = num_masked,
            "built hash index"
        );

        Ok(Self {
            geometry: WordGeometry {
                word_size,
                step_size,
            },
            buckets,
            num_words,
            num_masked,
            num_sequences: sequences.len(),
            total_occurrences,
        })
    }

    fn direct_buckets(
        table: FxHashMap<u32, Vec<Occurrence>>,
        word_size: usize,
        total_occurrences: usize,
    ) -> Buckets {
        let num_codes = 1usize << (2 * word_size);
        let mut entries: Vec<(u32, Vec<Occurrence>)> = table.into_iter().collect();
        entries.sort_unstable_by_key(|(code, _)| *code);

        let mut offsets = vec![0u32; num_codes + 1];
        for (code, occurrences) in &entries {
            offsets[*code as usize + 1] = occurrences.len() as u32;
        }
        for i in 1..offsets.len() {
            offsets[i] += offsets[i - 1];
        }

        let mut hits = Vec::with_capacity(total_occurrences);
        for (_, occurrences) in entries {
            hits.extend(occurrences);
        }

        Buckets::Direct { offsets, hits }
    }

    /// Occurrences of a packed word, `None` when absent or masked
    #[inline]
    pub fn lookup_hash(&self, code: u32) -> Option<&[Occurrence]> {
        match &self.buckets {
            Buckets::Direct { offsets, hits } => {
                let idx = code as usize;
                if idx + 1 >= offsets.len() {
                    return None;
                }
                let start = offsets[idx] as usize;
                let end = offsets[idx + 1] as usize;
                if start == end {
                    None
                } else {
                    Some(&hits[start..end])
                }
            }
            Buckets::Sparse(map) => map.get(&code).map(|occurrences| &occurrences[..]),
        }
    }

    /// Occurrences of `word`, which must be exactly `word_size` long
    pub fn lookup(&self, word: &[u8]) -> Option<&[Occurrence]> {
        if word.len() != self.geometry.word_size {
            return None;
        }
        hash_word(word, 0, word.len()).and_then(|code| self.lookup_hash(code))
    }

    /// Occurrences of the word starting at `seq[pos]`
    pub fn lookup_at(&self, seq: &[u8], pos: usize) -> Option<&[Occurrence]> {
        hash_word(seq, pos, self.geometry.word_size).and_then(|code| self.lookup_hash(code))
    }

    pub fn geometry(&self) -> WordGeometry {
        self.geometry
    }

    pub fn word_size(&self) -> usize {
        self.geometry.word_size
    }

    pub fn step_size(&self) -> usize {
        self.geometry.step_size
    }

    /// Distinct words retained after masking
    pub fn num_words(&self) -> usize {
        self.num_words
    }

    /// Distinct words dropped as low-complexity
    pub fn num_masked(&self) -> usize {
        self.num_masked
    }

    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    pub fn total_occurrences(&self) -> usize {
        self.total_occurrences
    }
}
