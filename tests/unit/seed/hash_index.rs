//! Unit tests for seed/hash_index.rs

use crate::helpers::{named, random_dna};
use anchorblast::config::{HashConfig, HashingPolicy};
use anchorblast::seed::{hash_word, unhash_word, HashIndex, Occurrence};
use rstest::rstest;

fn overlapping(word_size: usize) -> HashConfig {
    HashConfig {
        word_size,
        policy: HashingPolicy::Overlapping,
        ..HashConfig::default()
    }
}

#[rstest]
#[case(b"A")]
#[case(b"GATTACA")]
#[case(b"ACGTACGTACG")]
#[case(b"TTTTTTTTTTTTTTT")]
#[case(b"CAGTCAGGTACCATG")]
fn test_hash_roundtrip(#[case] word: &[u8]) {
    let code = hash_word(word, 0, word.len()).unwrap();
    assert_eq!(unhash_word(code, word.len()), word);
}

#[test]
fn test_hash_rejects_ambiguous_bases() {
    assert_eq!(hash_word(b"ACGNACGT", 0, 8), None);
    assert_eq!(hash_word(b"ACGT", 2, 4), None);
}

#[test]
fn test_non_overlapping_words_are_sampled_by_step() {
    let seq = random_dna(100, 7);
    let index = HashIndex::build(&[named("s", &seq)], &HashConfig::default()).unwrap();
    assert_eq!(index.step_size(), 11);
    // positions 0, 11, ..., 88
    assert_eq!(index.total_occurrences(), 9);

    let hits = index.lookup(&seq[22..33]).unwrap();
    assert!(hits.contains(&Occurrence {
        sequence_id: 0,
        position: 22
    }));
    // a query word that straddles two sampled positions is not indexed
    assert!(index
        .lookup(&seq[5..16])
        .map_or(true, |hits| hits.iter().all(|h| h.position != 5)));
}

#[test]
fn test_low_complexity_words_suppressed() {
    let mut seq = random_dna(400, 11);
    seq.extend(std::iter::repeat(b'A').take(100));
    let index = HashIndex::build(&[named("s", &seq)], &overlapping(11)).unwrap();

    assert_eq!(index.num_masked(), 1);
    assert!(index.lookup(b"AAAAAAAAAAA").is_none());
    assert!(index.lookup(&seq[10..21]).is_some());
}

#[test]
fn test_masking_disabled() {
    let seq = vec![b'C'; 60];
    let config = HashConfig {
        low_complexity_cutoff: None,
        ..overlapping(8)
    };
    let index = HashIndex::build(&[named("s", &seq)], &config).unwrap();
    assert_eq!(index.num_masked(), 0);
    assert_eq!(index.lookup(b"CCCCCCCC").map(|h| h.len()), Some(53));
}

#[rstest]
#[case(8)]
#[case(13)]
fn test_lookup_agrees_across_storage(#[case] word_size: usize) {
    let db = vec![named("a", &random_dna(300, 3)), named("b", &random_dna(300, 5))];
    let index = HashIndex::build(&db, &overlapping(word_size)).unwrap();
    let word = &db[1].as_bytes()[100..100 + word_size];
    let hits = index.lookup(word).unwrap();
    assert!(hits.contains(&Occurrence {
        sequence_id: 1,
        position: 100
    }));
}

#[test]
fn test_short_sequences_contribute_nothing() {
    let db = vec![named("short", b"ACGT"), named("long", &random_dna(50, 9))];
    let index = HashIndex::build(&db, &overlapping(11)).unwrap();
    assert_eq!(index.num_sequences(), 2);
    assert_eq!(index.total_occurrences(), 40);
}
