use super::PostProcessor;
use crate::align::{Alignment, SearchHit};
use crate::config::BestHits;
use crate::utils::ranking::rank_with_ambiguity;

/// Keep the `best.best` highest-scoring hits plus every further hit whose score is
/// within `best.ambiguity_threshold` of the top score. Ties keep their input order.
pub fn select_best(hits: Vec<SearchHit>, best: BestHits) -> Vec<SearchHit> {
    rank_with_ambiguity(hits, |h| h.score(), Some(best))
}

/// Best-N selection as a pipeline stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestHitSelector {
    pub best: BestHits,
}

impl PostProcessor for BestHitSelector {
    fn process(&self, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        select_best(hits, self.best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{AlignmentBuilder, PairwiseAlignment, Strand};
    use std::sync::Arc;

    fn hit(score: f64, db_start: usize) -> SearchHit {
        let mut builder = AlignmentBuilder::new();
        builder.append(b'A', b'A');
        SearchHit::Single(PairwiseAlignment::new(
            builder.build(score, db_start, 0),
            0,
            Arc::from("db"),
            Arc::from("q"),
            Strand::Plus,
        ))
    }

    fn scores(hits: &[SearchHit]) -> Vec<f64> {
        hits.iter().map(|h| h.score()).collect()
    }

    #[test]
    fn test_ties_at_cutoff_survive() {
        let hits = vec![hit(80.0, 0), hit(100.0, 1), hit(95.0, 2), hit(100.0, 3)];
        let kept = select_best(hits, BestHits::new(1, 4.0));
        assert_eq!(scores(&kept), vec![100.0, 100.0]);
        // stable order among equal scores
        assert_eq!(kept[0].database_start(), 2);
        assert_eq!(kept[1].database_start(), 4);
    }

    #[test]
    fn test_hits_within_margin_of_top_kept_beyond_best() {
        // best 1, but 100 and 95 are both within 10 of the top score
        let hits = vec![hit(100.0, 0), hit(100.0, 1), hit(95.0, 2), hit(80.0, 3)];
        let kept = BestHitSelector {
            best: BestHits::new(1, 10.0),
        }
        .process(hits);
        assert_eq!(scores(&kept), vec![100.0, 100.0, 95.0]);
    }

    #[test]
    fn test_fewer_hits_than_requested() {
        let kept = select_best(vec![hit(5.0, 0)], BestHits::new(3, 0.0));
        assert_eq!(kept.len(), 1);
    }
}
