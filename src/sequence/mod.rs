//! Nucleotide sequence collaborators
//!
//! The search core only needs indexed character access, a length and sub-range
//! extraction. [`NucleotideSequence`] captures that contract; [`NamedSequence`] adds
//! the identity used to attribute alignments.

use bio::alphabets::dna;
use std::borrow::Cow;
use std::sync::Arc;

/// Read contract for a nucleotide sequence
pub trait NucleotideSequence {
    fn len(&self) -> usize;

    /// Symbol at a 0-based position. Panics when out of range.
    fn base_at(&self, pos: usize) -> u8;

    /// `len` symbols starting at the 0-based `start`
    fn subsequence(&self, start: usize, len: usize) -> Cow<'_, [u8]>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.subsequence(0, self.len()).into_owned()
    }
}

impl NucleotideSequence for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    #[inline]
    fn base_at(&self, pos: usize) -> u8 {
        self[pos]
    }

    fn subsequence(&self, start: usize, len: usize) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self[start..start + len])
    }
}

impl NucleotideSequence for Vec<u8> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline]
    fn base_at(&self, pos: usize) -> u8 {
        self[pos]
    }

    fn subsequence(&self, start: usize, len: usize) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self[start..start + len])
    }
}

impl NucleotideSequence for str {
    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline]
    fn base_at(&self, pos: usize) -> u8 {
        self.as_bytes()[pos]
    }

    fn subsequence(&self, start: usize, len: usize) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.as_bytes()[start..start + len])
    }
}

impl NucleotideSequence for String {
    fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline]
    fn base_at(&self, pos: usize) -> u8 {
        self.as_bytes()[pos]
    }

    fn subsequence(&self, start: usize, len: usize) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.as_bytes()[start..start + len])
    }
}

/// Reverse complement of an IUPAC nucleotide sequence
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    dna::revcomp(seq)
}

/// A nucleotide sequence with a stable name, used for both database entries and queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedSequence {
    name: Arc<str>,
    sequence: Vec<u8>,
}

impl NamedSequence {
    pub fn new<S: NucleotideSequence + ?Sized>(name: impl Into<Arc<str>>, sequence: &S) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.to_bytes(),
        }
    }

    pub fn from_bytes(name: impl Into<Arc<str>>, sequence: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            sequence,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared handle to the name, cheap to clone into results
    pub fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The same sequence on the opposite strand, keeping the name
    pub fn reverse_complement(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            sequence: reverse_complement(&self.sequence),
        }
    }
}

impl NucleotideSequence for NamedSequence {
    fn len(&self) -> usize {
        self.sequence.len()
    }

    #[inline]
    fn base_at(&self, pos: usize) -> u8 {
        self.sequence[pos]
    }

    fn subsequence(&self, start: usize, len: usize) -> Cow<'_, [u8]> {
        Cow::Borrowed(&self.sequence[start..start + len])
    }
}

impl From<&bio::io::fasta::Record> for NamedSequence {
    fn from(record: &bio::io::fasta::Record) -> Self {
        Self::from_bytes(record.id(), record.seq().to_vec())
    }
}
