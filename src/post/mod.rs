//! Post-processing of accepted alignments
//!
//! Significance filtering runs per alignment during extension; the
//! [`PostProcessor`] stages run once per query over everything accepted.

pub mod aggregate;
pub mod best_hits;
pub mod filter;

pub use aggregate::PartialAlignmentAggregator;
pub use best_hits::{select_best, BestHitSelector};
pub use filter::{build_filter, AcceptAll, MinimumScore, SignificanceFilter};

use crate::align::SearchHit;
use crate::config::SearchConfig;
use crate::utils::matrix::ScoringMatrix;

/// One stage of the per-query result pipeline
pub trait PostProcessor: Send + Sync {
    fn process(&self, hits: Vec<SearchHit>) -> Vec<SearchHit>;
}

/// Aggregation (if configured), then best-hit selection (if configured)
pub fn build_pipeline(config: &SearchConfig, matrix: &ScoringMatrix) -> Vec<Box<dyn PostProcessor>> {
    let mut stages: Vec<Box<dyn PostProcessor>> = Vec::new();
    if let Some(aggregation) = config.aggregation {
        stages.push(Box::new(PartialAlignmentAggregator::new(
            aggregation,
            matrix.clone(),
        )));
    }
    if let Some(best) = config.effective_best_hits() {
        stages.push(Box::new(BestHitSelector { best }));
    }
    stages
}
