//! Partial-alignment aggregation
//!
//! Alignments of one query that sit collinearly on the same database sequence and
//! strand (exons separated by introns) are chained into a [`CompositeAlignment`].
//! Where adjacent segments claim the same query bases, every split of the contested
//! bases is rescored with the affine model and the best partition is kept.

use super::filter::calculate_overlap;
use super::PostProcessor;
use crate::align::result::GAP;
use crate::align::{Alignment, CompositeAlignment, LocalAlignment, PairwiseAlignment, SearchHit};
use crate::config::AggregationConfig;
use crate::utils::matrix::ScoringMatrix;
use tracing::debug;

/// Chains collinear partial alignments into composite hits
#[derive(Debug, Clone)]
pub struct PartialAlignmentAggregator {
    /// Largest query overlap tolerated between a segment and the chain tail
    pub maximum_overlap: usize,
    /// Largest gap to the chain tail, in both coordinates
    pub maximum_distance: Option<usize>,
    matrix: ScoringMatrix,
}

impl PartialAlignmentAggregator {
    pub fn new(config: AggregationConfig, matrix: ScoringMatrix) -> Self {
        Self {
            maximum_overlap: config.maximum_overlap,
            maximum_distance: config.maximum_distance,
            matrix,
        }
    }

    /// Whether `candidate` may follow `tail` in a chain
    pub fn accepts(&self, tail: &PairwiseAlignment, candidate: &PairwiseAlignment) -> bool {
        if tail.database_id() != candidate.database_id() || tail.strand() != candidate.strand() {
            return false;
        }
        if candidate.database_start() <= tail.database_start()
            || candidate.query_start() <= tail.query_start()
        {
            return false;
        }
        let query_overlap = calculate_overlap(
            tail.query_start(),
            tail.query_end(),
            candidate.query_start(),
            candidate.query_end(),
        );
        if query_overlap > self.maximum_overlap {
            return false;
        }
        if candidate.database_start() <= tail.database_end() {
            return false;
        }
        match self.maximum_distance {
            Some(max) => {
                let database_gap = candidate.database_start() - tail.database_end() - 1;
                let query_gap = candidate.query_start().saturating_sub(tail.query_end() + 1);
                database_gap <= max && query_gap <= max
            }
            None => true,
        }
    }

    /// Chain single alignments; singleton chains come back as [`SearchHit::Single`]
    pub fn aggregate(&self, mut alignments: Vec<PairwiseAlignment>) -> Vec<SearchHit> {
        alignments.sort_by_key(|a| {
            (
                a.database_id(),
                a.strand(),
                a.database_start(),
                a.query_start(),
            )
        });

        let mut chains: Vec<Vec<PairwiseAlignment>> = Vec::new();
        let mut open_from = 0usize;
        for alignment in alignments {
            if chains.last().is_some_and(|c| {
                c[0].database_id() != alignment.database_id() || c[0].strand() != alignment.strand()
            }) {
                open_from = chains.len();
            }

            let mut target: Option<(usize, f64)> = None;
            for (i, chain) in chains.iter().enumerate().skip(open_from) {
                let tail = &chain[chain.len() - 1];
                if !self.accepts(tail, &alignment) {
                    continue;
                }
                let score: f64 = chain.iter().map(|s| s.score()).sum();
                if target.map_or(true, |(_, best)| score > best) {
                    target = Some((i, score));
                }
            }

            match target {
                Some((i, _)) => chains[i].push(alignment),
                None => chains.push(vec![alignment]),
            }
        }

        let composites = chains.iter().filter(|c| c.len() > 1).count();
        if composites > 0 {
            debug!("Aggregated {} composite alignments", composites);
        }

        chains
            .into_iter()
            .filter_map(|mut chain| match chain.len() {
                0 => None,
                1 => chain.pop().map(SearchHit::Single),
                _ => Some(SearchHit::Composite(CompositeAlignment::new(
                    self.polish(chain),
                ))),
            })
            .collect()
    }

    /// Resolve query overlaps between consecutive segments, left to right
    pub fn polish(&self, segments: Vec<PairwiseAlignment>) -> Vec<PairwiseAlignment> {
        let mut polished: Vec<PairwiseAlignment> = Vec::with_capacity(segments.len());
        for segment in segments {
            match polished.last_mut() {
                Some(previous) => {
                    let (left, right) = self.resolve_overlap(previous, &segment);
                    *previous = left;
                    polished.push(right);
                }
                None => polished.push(segment),
            }
        }
        polished
    }

    fn resolve_overlap(
        &self,
        left: &PairwiseAlignment,
        right: &PairwiseAlignment,
    ) -> (PairwiseAlignment, PairwiseAlignment) {
        let overlap = calculate_overlap(
            left.query_start(),
            left.query_end(),
            right.query_start(),
            right.query_end(),
        );
        if overlap == 0 {
            return (left.clone(), right.clone());
        }

        let mut best: Option<(f64, LocalAlignment, LocalAlignment)> = None;
        for kept_by_left in 0..=overlap {
            let Some(l) = trim_query_end(left.alignment(), overlap - kept_by_left) else {
                continue;
            };
            let Some(r) = trim_query_start(right.alignment(), kept_by_left) else {
                continue;
            };
            let total = self.affine(&l) + self.affine(&r);
            if best.as_ref().map_or(true, |(score, _, _)| total > *score) {
                best = Some((total, l, r));
            }
        }

        match best {
            Some((_, l, r)) => {
                let l = self.rescored(left.alignment(), l);
                let r = self.rescored(right.alignment(), r);
                (left.with_alignment(l), right.with_alignment(r))
            }
            None => (left.clone(), right.clone()),
        }
    }

    fn affine(&self, alignment: &LocalAlignment) -> f64 {
        self.matrix
            .score_columns(&alignment.database_aligned, &alignment.query_aligned)
    }

    /// Carry the score change of trimming over to the segment's own score
    fn rescored(&self, original: &LocalAlignment, mut trimmed: LocalAlignment) -> LocalAlignment {
        trimmed.score = original.score + self.affine(&trimmed) - self.affine(original);
        trimmed
    }
}

impl PostProcessor for PartialAlignmentAggregator {
    fn process(&self, hits: Vec<SearchHit>) -> Vec<SearchHit> {
        let mut singles = Vec::with_capacity(hits.len());
        let mut passthrough = Vec::new();
        for hit in hits {
            match hit {
                SearchHit::Single(alignment) => singles.push(alignment),
                composite => passthrough.push(composite),
            }
        }
        let mut aggregated = self.aggregate(singles);
        aggregated.extend(passthrough);
        aggregated
    }
}

fn is_gap_column(&(d, q): &(u8, u8)) -> bool {
    d == GAP || q == GAP
}

/// Drop the last `bases` query bases, then any trailing gap columns
fn trim_query_end(alignment: &LocalAlignment, bases: usize) -> Option<LocalAlignment> {
    let mut columns: Vec<(u8, u8)> = alignment.columns().collect();
    let mut removed_database = 0;
    let mut removed_query = 0;
    while removed_query < bases || columns.last().is_some_and(is_gap_column) {
        let (d, q) = columns.pop()?;
        if d != GAP {
            removed_database += 1;
        }
        if q != GAP {
            removed_query += 1;
        }
    }
    if columns.is_empty() {
        return None;
    }
    let (database_aligned, query_aligned) = columns.into_iter().unzip();
    Some(LocalAlignment {
        database_aligned,
        query_aligned,
        score: alignment.score,
        database_start: alignment.database_start,
        database_end: alignment.database_end - removed_database,
        query_start: alignment.query_start,
        query_end: alignment.query_end - removed_query,
    })
}

/// Drop the first `bases` query bases, then any leading gap columns
fn trim_query_start(alignment: &LocalAlignment, bases: usize) -> Option<LocalAlignment> {
    let columns: Vec<(u8, u8)> = alignment.columns().collect();
    let mut cut = 0;
    let mut removed_database = 0;
    let mut removed_query = 0;
    while removed_query < bases || columns.get(cut).is_some_and(is_gap_column) {
        let &(d, q) = columns.get(cut)?;
        if d != GAP {
            removed_database += 1;
        }
        if q != GAP {
            removed_query += 1;
        }
        cut += 1;
    }
    if cut >= columns.len() {
        return None;
    }
    let (database_aligned, query_aligned) = columns[cut..].iter().copied().unzip();
    Some(LocalAlignment {
        database_aligned,
        query_aligned,
        score: alignment.score,
        database_start: alignment.database_start + removed_database,
        database_end: alignment.database_end,
        query_start: alignment.query_start + removed_query,
        query_end: alignment.query_end,
    })
}
