//! Unit tests for post/best_hits.rs

use crate::helpers::exact_alignment;
use anchorblast::config::BestHits;
use anchorblast::post::select_best;
use anchorblast::{Alignment, PairwiseAlignment, SearchHit};
use rstest::rstest;

fn scored(score: f64, database_start: usize) -> SearchHit {
    let base = exact_alignment(database_start, 0, 10);
    let mut alignment = base.alignment().clone();
    alignment.score = score;
    SearchHit::Single(PairwiseAlignment::with_alignment(&base, alignment))
}

#[rstest]
#[case(1, 4.0, vec![100.0, 100.0])]
#[case(1, 10.0, vec![100.0, 100.0, 95.0])]
#[case(3, 0.0, vec![100.0, 100.0, 95.0])]
#[case(2, 20.0, vec![100.0, 100.0, 95.0, 80.0])]
fn test_best_with_ambiguity(
    #[case] best: usize,
    #[case] threshold: f64,
    #[case] expected: Vec<f64>,
) {
    let hits = vec![
        scored(95.0, 0),
        scored(100.0, 100),
        scored(80.0, 200),
        scored(100.0, 300),
    ];
    let kept = select_best(hits, BestHits::new(best, threshold));
    let scores: Vec<f64> = kept.iter().map(|h| h.score()).collect();
    assert_eq!(scores, expected);
}

#[test]
fn test_equal_scores_keep_input_order() {
    let hits = vec![scored(50.0, 0), scored(50.0, 100), scored(50.0, 200)];
    let kept = select_best(hits, BestHits::new(1, 0.0));
    let starts: Vec<usize> = kept.iter().map(|h| h.database_start()).collect();
    assert_eq!(starts, vec![1, 101, 201]);
}
