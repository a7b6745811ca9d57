//! Unit tests for align/homopolymer.rs

use anchorblast::align::{homopolymer, sw_gotoh, DpMode, GapProfile, HomopolymerModel};
use anchorblast::config::HomopolymerConfig;
use anchorblast::ScoringMatrix;
use rstest::rstest;

const LEFT: &[u8] = b"GATCGTCAGG";
const RIGHT: &[u8] = b"CAGTCAGCGA";

/// Flanks around a T run of length `run`
fn with_run(run: usize) -> Vec<u8> {
    [LEFT, vec![b'T'; run].as_slice(), RIGHT].concat()
}

/// Cost of deleting one base from a run of length `run`
fn deletion_cost(run: usize, homopolymer_aware: bool) -> f64 {
    let matrix = ScoringMatrix::long_read();
    let db = with_run(run);
    let query = with_run(run - 1);
    let score = if homopolymer_aware {
        let model = HomopolymerModel::new(&matrix, &HomopolymerConfig::default());
        homopolymer::align(&db, &query, &matrix, &model, DpMode::Local)
            .unwrap()
            .score
    } else {
        sw_gotoh::align(&db, &query, &matrix, DpMode::Local)
            .unwrap()
            .score
    };
    query.len() as f64 - score
}

#[test]
fn test_profile_penalties_decay_within_run() {
    let matrix = ScoringMatrix::long_read();
    let profile = GapProfile::new(b"ACCCCCG", &matrix);
    let p = profile.penalties();
    assert_eq!(p.len(), 7);
    for w in p[1..6].windows(2) {
        assert!(w[1] <= w[0]);
    }
    assert!(p.iter().all(|&x| x >= 2.0 * matrix.gap_extend()));
    assert_eq!(
        profile.boundaries(),
        &[true, true, false, false, false, false, true]
    );
}

#[rstest]
#[case(3)]
#[case(5)]
#[case(8)]
fn test_gap_in_run_cheaper_than_affine(#[case] run: usize) {
    let plain = deletion_cost(run, false);
    let aware = deletion_cost(run, true);
    assert!((plain - ScoringMatrix::long_read().gap_exist()).abs() < 1e-9);
    assert!(aware < plain - 1e-9, "run {run}: {aware} vs {plain}");
}

#[test]
fn test_gap_cost_non_increasing_with_run_length() {
    let costs: Vec<f64> = (3..10).map(|run| deletion_cost(run, true)).collect();
    for w in costs.windows(2) {
        assert!(w[1] <= w[0] + 1e-9, "{costs:?}");
    }
}

#[test]
fn test_matches_plain_gotoh_without_gaps() {
    let matrix = ScoringMatrix::long_read();
    let model = HomopolymerModel::new(&matrix, &HomopolymerConfig::default());
    let db = b"ACGGTCATTTGACCA";
    let query = b"ACGGTCAGTTGACCA";
    let aware = homopolymer::align(db, query, &matrix, &model, DpMode::Local).unwrap();
    let plain = sw_gotoh::align(db, query, &matrix, DpMode::Local).unwrap();
    assert!((aware.score - plain.score).abs() < 1e-9);
    assert_eq!(aware.database_aligned, plain.database_aligned);
}
