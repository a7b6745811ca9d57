//! Unit tests for post/aggregate.rs

use crate::helpers::exact_alignment;
use anchorblast::config::AggregationConfig;
use anchorblast::post::PartialAlignmentAggregator;
use anchorblast::{Alignment, ScoringMatrix, SearchHit};
use rstest::rstest;

fn aggregator(maximum_distance: usize) -> PartialAlignmentAggregator {
    PartialAlignmentAggregator::new(
        AggregationConfig {
            maximum_overlap: 10,
            maximum_distance: Some(maximum_distance),
        },
        ScoringMatrix::blastn(),
    )
}

#[rstest]
#[case(100, 1)]
#[case(10, 2)]
fn test_distance_limits_chaining(#[case] maximum_distance: usize, #[case] expected_hits: usize) {
    // 50 database bases between the segments
    let segments = vec![exact_alignment(70, 20, 20), exact_alignment(0, 0, 20)];
    let hits = aggregator(maximum_distance).aggregate(segments);

    assert_eq!(hits.len(), expected_hits);
    let total: f64 = hits.iter().map(|h| h.score()).sum();
    assert_eq!(total, 40.0);
    if expected_hits == 1 {
        assert!(hits[0].is_composite());
        assert_eq!(hits[0].segments().len(), 2);
        assert_eq!((hits[0].database_start(), hits[0].database_end()), (1, 90));
        assert_eq!((hits[0].query_start(), hits[0].query_end()), (1, 40));
    } else {
        assert!(hits.iter().all(|h| !h.is_composite()));
    }
}

#[test]
fn test_query_overlap_is_polished() {
    // second segment re-covers query bases 15..20
    let segments = vec![exact_alignment(0, 0, 20), exact_alignment(70, 14, 20)];
    let hits = aggregator(100).aggregate(segments);

    assert_eq!(hits.len(), 1);
    let SearchHit::Composite(composite) = &hits[0] else {
        panic!("expected a composite hit");
    };
    let parts = composite.segments();
    assert_eq!(parts[0].query_end() + 1, parts[1].query_start());
    assert_eq!(composite.query_start(), 1);
    assert_eq!(composite.query_end(), 34);
    assert_eq!(composite.score(), 34.0);
}

#[test]
fn test_overlap_beyond_limit_not_chained() {
    let segments = vec![exact_alignment(0, 0, 30), exact_alignment(100, 10, 30)];
    let hits = aggregator(1000).aggregate(segments);
    assert_eq!(hits.len(), 2);
}
