//! Unit tests for align/extender.rs and align/sw_gotoh.rs

use crate::helpers::random_dna;
use anchorblast::align::{
    sw_gotoh, AnchoredBandedSmithWatermanGotoh, AnchoredSmithWatermanGotoh, Anchor, DpMode,
    Extender, Strand,
};
use anchorblast::config::BandedConfig;
use anchorblast::ScoringMatrix;

#[test]
fn test_exact_match_scores_full_length() {
    let matrix = ScoringMatrix::blastn();
    let seq = random_dna(50, 3);
    let aln = sw_gotoh::align(&seq, &seq, &matrix, DpMode::Local).unwrap();
    assert_eq!(aln.score, 50.0);
    assert_eq!((aln.database_start, aln.database_end), (1, 50));
    assert_eq!((aln.query_start, aln.query_end), (1, 50));
    assert_eq!(aln.stats().matches, 50);
}

#[test]
fn test_windowed_extension_of_substring() {
    let matrix = ScoringMatrix::blastn();
    let db = random_dna(300, 5);
    let query = &db[100..180];
    let extender = AnchoredSmithWatermanGotoh::default();

    let aln = extender
        .extend(&db, query, &matrix, Anchor::new(110, 10), Strand::Plus)
        .unwrap();
    assert_eq!(aln.score, 80.0);
    assert_eq!((aln.database_start, aln.database_end), (101, 180));
    assert_eq!((aln.query_start, aln.query_end), (1, 80));
}

#[test]
fn test_single_insertion_costs_one_gap_open() {
    let matrix = ScoringMatrix::blastn();
    let db = random_dna(300, 8);
    let mut query = db[100..140].to_vec();
    query.push(b'N');
    query.extend_from_slice(&db[140..180]);

    let aln = AnchoredSmithWatermanGotoh::default()
        .extend(&db, &query, &matrix, Anchor::new(105, 5), Strand::Plus)
        .unwrap();
    assert_eq!(aln.score, 80.0 - matrix.gap_exist());
    let stats = aln.stats();
    assert_eq!(stats.gap_opens, 1);
    assert_eq!(stats.matches, 80);
    assert_eq!((aln.query_start, aln.query_end), (1, 81));
}

#[test]
fn test_banded_extension_covers_long_query() {
    let matrix = ScoringMatrix::blastn();
    let db = random_dna(1900, 13);
    let query = &db[200..1700];
    let extender = AnchoredBandedSmithWatermanGotoh {
        banded: BandedConfig::default(),
        fallback: AnchoredSmithWatermanGotoh::default(),
    };

    let aln = extender
        .extend(&db, query, &matrix, Anchor::new(700, 500), Strand::Plus)
        .unwrap();
    assert_eq!(aln.score, 1500.0);
    assert_eq!((aln.database_start, aln.database_end), (201, 1700));
    assert_eq!((aln.query_start, aln.query_end), (1, 1500));
    assert_eq!(aln.database_aligned, query);
}

#[test]
fn test_empty_query_gives_empty_alignment() {
    let matrix = ScoringMatrix::blastn();
    let aln = AnchoredSmithWatermanGotoh::default()
        .extend(b"ACGT", b"", &matrix, Anchor::new(0, 0), Strand::Plus)
        .unwrap();
    assert!(aln.is_empty());
}

#[test]
#[should_panic(expected = "outside sequences")]
fn test_anchor_outside_sequences_panics() {
    let matrix = ScoringMatrix::blastn();
    let _ = AnchoredSmithWatermanGotoh::default().extend(
        b"ACGTACGT",
        b"ACGT",
        &matrix,
        Anchor::new(20, 0),
        Strand::Plus,
    );
}
