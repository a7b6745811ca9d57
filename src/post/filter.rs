use crate::align::{Alignment, PairwiseAlignment};

/// Decides whether a freshly extended alignment is kept
pub trait SignificanceFilter: Send + Sync {
    fn is_significant(&self, alignment: &PairwiseAlignment) -> bool;
}

/// Keeps every alignment
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl SignificanceFilter for AcceptAll {
    fn is_significant(&self, _alignment: &PairwiseAlignment) -> bool {
        true
    }
}

/// Keeps alignments scoring at least the given value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimumScore(pub f64);

impl SignificanceFilter for MinimumScore {
    fn is_significant(&self, alignment: &PairwiseAlignment) -> bool {
        alignment.score() >= self.0
    }
}

/// `None` accepts everything
pub fn build_filter(minimum_score: Option<f64>) -> Box<dyn SignificanceFilter> {
    match minimum_score {
        Some(min) => Box::new(MinimumScore(min)),
        None => Box::new(AcceptAll),
    }
}

/// Calculate overlap between two inclusive intervals
pub(crate) fn calculate_overlap(start1: usize, end1: usize, start2: usize, end2: usize) -> usize {
    let overlap_start = start1.max(start2);
    let overlap_end = end1.min(end2);

    if overlap_start <= overlap_end {
        overlap_end - overlap_start + 1
    } else {
        0
    }
}
