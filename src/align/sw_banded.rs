//! Chunked 5'/3' extension for long queries
//!
//! Each direction is extended from the anchor in `chunk_size` square chunks, every
//! chunk aligned with its origin pinned to the end of what has been committed so
//! far. All but the last `overlap` columns of a chunk are committed (cut back to a
//! diagonal column so no gap straddles two chunks) and the next chunk re-evaluates
//! the rest. A chunk whose best end lies more than `overlap` away from the far edge
//! in both sequences has found the natural end of the alignment.

use super::homopolymer::{self, HomopolymerModel};
use super::result::{Anchor, AlignmentBuilder, LocalAlignment, GAP};
use super::sw_gotoh::{self, DpMode};
use super::traceback::TracedAlignment;
use crate::config::BandedConfig;
use crate::utils::matrix::ScoringMatrix;
use anyhow::Result;
use tracing::trace;

/// Dynamic programming run on each chunk
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChunkModel {
    Gotoh,
    /// Homopolymer-aware chunks; `reverse` aligns each chunk on its reversed
    /// fragments with the end pinned, then mirrors the result back
    Homopolymer {
        model: HomopolymerModel,
        reverse: bool,
    },
}

impl ChunkModel {
    fn align_chunk(
        &self,
        database: &[u8],
        query: &[u8],
        matrix: &ScoringMatrix,
    ) -> Result<TracedAlignment> {
        match self {
            ChunkModel::Gotoh => {
                sw_gotoh::align_traced(database, query, matrix, DpMode::AnchoredStart)
            }
            ChunkModel::Homopolymer {
                model,
                reverse: false,
            } => homopolymer::align_traced(database, query, matrix, model, DpMode::AnchoredStart),
            ChunkModel::Homopolymer {
                model,
                reverse: true,
            } => {
                let database_rev: Vec<u8> = database.iter().rev().copied().collect();
                let query_rev: Vec<u8> = query.iter().rev().copied().collect();
                let traced = homopolymer::align_traced(
                    &database_rev,
                    &query_rev,
                    matrix,
                    model,
                    DpMode::AnchoredEnd,
                )?;
                Ok(traced.reversed(database.len(), query.len()))
            }
        }
    }
}

/// Result of a gapped extension in one direction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionResult {
    /// Committed columns, nearest to the origin first
    pub columns: Vec<(u8, u8)>,
    pub score: f64,
    pub database_consumed: usize,
    pub query_consumed: usize,
    /// Number of chunks aligned
    pub chunks: usize,
}

impl ExtensionResult {
    fn commit<I: IntoIterator<Item = (u8, u8)>>(&mut self, columns: I, score: f64) {
        for (d, q) in columns {
            if d != GAP {
                self.database_consumed += 1;
            }
            if q != GAP {
                self.query_consumed += 1;
            }
            self.columns.push((d, q));
        }
        self.score += score;
    }
}

/// Columns of `alignment` safe to commit before the next chunk: all but the last
/// `overlap`, cut back to the last column pairing two bases
fn committable(alignment: &LocalAlignment, overlap: usize) -> usize {
    let mut keep = alignment.len().saturating_sub(overlap);
    while keep > 0
        && (alignment.database_aligned[keep - 1] == GAP || alignment.query_aligned[keep - 1] == GAP)
    {
        keep -= 1;
    }
    keep
}

/// Extend from the start of `database`/`query` towards their ends
pub fn extend_one_direction(
    database: &[u8],
    query: &[u8],
    matrix: &ScoringMatrix,
    model: ChunkModel,
    config: &BandedConfig,
) -> Result<ExtensionResult> {
    let mut result = ExtensionResult::default();

    while result.database_consumed < database.len() && result.query_consumed < query.len() {
        let db_pos = result.database_consumed;
        let q_pos = result.query_consumed;
        let db_end = (db_pos + config.chunk_size).min(database.len());
        let q_end = (q_pos + config.chunk_size).min(query.len());
        let db_chunk = &database[db_pos..db_end];
        let q_chunk = &query[q_pos..q_end];

        let traced = model.align_chunk(db_chunk, q_chunk, matrix)?;
        result.chunks += 1;
        let alignment = traced.alignment;
        if alignment.is_empty() {
            break;
        }

        let exhausted = db_end == database.len() || q_end == query.len();
        let natural_end = db_chunk.len() - alignment.database_end > config.overlap
            && q_chunk.len() - alignment.query_end > config.overlap;
        if exhausted || natural_end {
            result.commit(alignment.columns(), alignment.score);
            break;
        }

        let keep = committable(&alignment, config.overlap);
        if keep == 0 {
            result.commit(alignment.columns(), alignment.score);
            break;
        }
        result.commit(alignment.columns().take(keep), traced.running_scores[keep - 1]);
    }

    Ok(result)
}

/// Pair the anchor bases, extend 3' and 5' of them and splice both sides together.
///
/// The anchor column is committed as a diagonal first, so gaps opened by the two
/// directions never touch and each is scored once.
pub fn extend_with_traceback(
    database: &[u8],
    query: &[u8],
    matrix: &ScoringMatrix,
    anchor: Anchor,
    model: ChunkModel,
    config: &BandedConfig,
) -> Result<LocalAlignment> {
    let anchor_database = database[anchor.database_position];
    let anchor_query = query[anchor.query_position];
    let anchor_score = matrix.score(anchor_database, anchor_query);

    let three_prime = extend_one_direction(
        &database[anchor.database_position + 1..],
        &query[anchor.query_position + 1..],
        matrix,
        model,
        config,
    )?;

    let database_upstream: Vec<u8> = database[..anchor.database_position]
        .iter()
        .rev()
        .copied()
        .collect();
    let query_upstream: Vec<u8> = query[..anchor.query_position]
        .iter()
        .rev()
        .copied()
        .collect();
    let five_prime =
        extend_one_direction(&database_upstream, &query_upstream, matrix, model, config)?;

    trace!(
        "Banded extension at {}:{} used {} + {} chunks",
        anchor.database_position,
        anchor.query_position,
        five_prime.chunks,
        three_prime.chunks
    );

    let mut builder = AlignmentBuilder::new();
    builder.append(anchor_database, anchor_query);
    builder.append_columns(three_prime.columns);
    builder.prepend_columns(five_prime.columns);
    Ok(builder.build(
        five_prime.score + anchor_score + three_prime.score,
        anchor.database_position - five_prime.database_consumed,
        anchor.query_position - five_prime.query_consumed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HomopolymerConfig;

    fn config() -> BandedConfig {
        BandedConfig {
            chunk_size: 20,
            overlap: 5,
            activation_threshold: 0,
        }
    }

    fn sequence(len: usize, seed: u64) -> Vec<u8> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                b"ACGT"[(state >> 62) as usize]
            })
            .collect()
    }

    #[test]
    fn test_exact_match_spans_many_chunks() {
        let matrix = ScoringMatrix::blastn();
        let seq = sequence(100, 7);
        let aln = extend_with_traceback(&seq, &seq, &matrix, Anchor::new(50, 50), ChunkModel::Gotoh, &config())
            .unwrap();
        assert_eq!(aln.score, 100.0);
        assert_eq!((aln.database_start, aln.database_end), (1, 100));
        assert_eq!((aln.query_start, aln.query_end), (1, 100));
        assert_eq!(aln.database_aligned, seq);
    }

    #[test]
    fn test_indel_between_chunks() {
        let matrix = ScoringMatrix::blastn();
        let db = sequence(120, 11);
        let mut query = db.clone();
        query.remove(37);
        let aln = extend_with_traceback(&db, &query, &matrix, Anchor::new(0, 0), ChunkModel::Gotoh, &config())
            .unwrap();
        assert_eq!(aln.query_aligned.iter().filter(|&&b| b == GAP).count(), 1);
        assert_eq!(aln.score, 119.0 - 5.0);
        assert_eq!((aln.database_end, aln.query_end), (120, 119));
        assert_eq!(aln.score, matrix.score_columns(&aln.database_aligned, &aln.query_aligned));
    }

    #[test]
    fn test_gaps_on_both_sides_of_anchor_scored_separately() {
        let matrix = ScoringMatrix::blastn();
        let db = sequence(67, 13);
        // one base missing just before the anchor, two just after it
        let mut query = db.clone();
        query.drain(13..15);
        query.remove(11);
        let aln = extend_with_traceback(&db, &query, &matrix, Anchor::new(12, 11), ChunkModel::Gotoh, &config())
            .unwrap();
        assert_eq!(aln.score, matrix.score_columns(&aln.database_aligned, &aln.query_aligned));
        assert_eq!((aln.database_end, aln.query_end), (67, 64));
    }

    #[test]
    fn test_stops_at_natural_end() {
        let matrix = ScoringMatrix::blastn();
        let shared = sequence(30, 3);
        let mut db = shared.clone();
        db.extend(sequence(60, 5));
        let mut query = shared.clone();
        query.extend(sequence(60, 9));
        let three = extend_one_direction(&db, &query, &matrix, ChunkModel::Gotoh, &config()).unwrap();
        assert!(three.query_consumed >= 30 && three.query_consumed < 45);
        assert!(three.score >= 30.0);
    }

    #[test]
    fn test_reversed_homopolymer_chunks_match_forward_on_exact_match() {
        let matrix = ScoringMatrix::long_read();
        let model = HomopolymerModel::new(&matrix, &HomopolymerConfig::default());
        let seq = sequence(64, 21);
        for reverse in [false, true] {
            let aln = extend_with_traceback(
                &seq,
                &seq,
                &matrix,
                Anchor::new(10, 10),
                ChunkModel::Homopolymer { model, reverse },
                &config(),
            )
            .unwrap();
            assert!((aln.score - 64.0).abs() < 1e-9);
            assert_eq!((aln.query_start, aln.query_end), (1, 64));
        }
    }
}
