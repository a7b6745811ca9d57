//! Window sizing around an anchor
//!
//! A side of the query with `remaining` bases left can absorb at most
//! `(remaining * highest - gap_exist) / gap_extend` gap positions before its score
//! turns negative, so the database window is widened by that much on each side.

use super::result::Anchor;
use crate::utils::matrix::ScoringMatrix;
use std::ops::Range;

/// Smallest shift applied on either side of the anchor
pub const MIN_SHIFT: usize = 10;

/// Extra database bases to include beyond the query's projection on one side
pub fn shift(remaining: usize, matrix: &ScoringMatrix, maximum: Option<usize>) -> usize {
    let estimate =
        (remaining as f64 * matrix.highest_score() - matrix.gap_exist()) / matrix.gap_extend();
    let shift = if estimate.is_finite() && estimate > MIN_SHIFT as f64 {
        estimate as usize
    } else {
        MIN_SHIFT
    };
    match maximum {
        Some(max) => shift.min(max),
        None => shift,
    }
}

/// Database range handed to dynamic programming for `anchor`.
///
/// Covers `[anchor_db - anchor_q - shift5, anchor_db + (query_len - anchor_q) + shift3)`
/// clamped to the sequence; the query is always used whole.
pub fn database_window(
    database_len: usize,
    query_len: usize,
    anchor: Anchor,
    matrix: &ScoringMatrix,
    maximum: Option<usize>,
) -> Range<usize> {
    let upstream = anchor.query_position;
    let downstream = query_len.saturating_sub(anchor.query_position);
    let shift5 = shift(upstream, matrix, maximum);
    let shift3 = shift(downstream, matrix, maximum);

    let start = anchor.database_position.saturating_sub(upstream + shift5);
    let end = (anchor.database_position + downstream + shift3).min(database_len);
    start..end
}
