//! Test utilities shared across the unit tests

use anchorblast::align::{AlignmentBuilder, PairwiseAlignment, Strand};
use anchorblast::NamedSequence;
use std::sync::Arc;

/// Deterministic pseudo-random DNA (xorshift64)
pub fn random_dna(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            b"ACGT"[(state >> 32) as usize % 4]
        })
        .collect()
}

pub fn named(name: &str, seq: &[u8]) -> NamedSequence {
    NamedSequence::from_bytes(name, seq.to_vec())
}

/// Gap-free plus-strand alignment of `len` matching columns.
/// Starts are 0-based; the alignment reports 1-based coordinates.
pub fn exact_alignment(database_start: usize, query_start: usize, len: usize) -> PairwiseAlignment {
    let mut builder = AlignmentBuilder::new();
    for _ in 0..len {
        builder.append(b'A', b'A');
    }
    PairwiseAlignment::new(
        builder.build(len as f64, database_start, query_start),
        0,
        Arc::from("db"),
        Arc::from("query"),
        Strand::Plus,
    )
}
