//! Affine-gap Smith-Waterman-Gotoh alignment
//!
//! Gap of length `L` costs `gap_exist + (L - 1) * gap_extend`. Rows of the dynamic
//! programming matrix index the query, columns the database.

use super::result::LocalAlignment;
use super::traceback::{
    traceback, AffineScores, TraceCell, TracebackDir, TracebackMatrix, TracedAlignment,
};
use crate::error::SearchError;
use crate::utils::matrix::ScoringMatrix;
use anyhow::Result;

/// Boundary conditions of the recurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DpMode {
    /// Scores floored at zero; best cell anywhere
    #[default]
    Local,
    /// Alignment starts at the first base of both sequences; best cell anywhere
    AnchoredStart,
    /// Alignment ends at the last base of both sequences; start anywhere
    AnchoredEnd,
}

impl DpMode {
    #[inline]
    pub(crate) fn floored(self) -> bool {
        !matches!(self, DpMode::AnchoredStart)
    }
}

/// Full score matrices, row-major with `cols = database.len() + 1`
struct GotohScores {
    h: Vec<f64>,
    up: Vec<f64>,
    left: Vec<f64>,
    cols: usize,
}

impl AffineScores for GotohScores {
    fn h(&self, row: usize, col: usize) -> f64 {
        self.h[row * self.cols + col]
    }
    fn up(&self, row: usize, col: usize) -> f64 {
        self.up[row * self.cols + col]
    }
    fn left(&self, row: usize, col: usize) -> f64 {
        self.left[row * self.cols + col]
    }
}

/// Align `query` against `database` and return the best alignment under `mode`.
///
/// Returns the empty alignment when no positive-scoring alignment exists.
pub fn align(
    database: &[u8],
    query: &[u8],
    matrix: &ScoringMatrix,
    mode: DpMode,
) -> Result<LocalAlignment> {
    align_traced(database, query, matrix, mode).map(|t| t.alignment)
}

/// [`align`] plus the running score after each alignment column
pub fn align_traced(
    database: &[u8],
    query: &[u8],
    matrix: &ScoringMatrix,
    mode: DpMode,
) -> Result<TracedAlignment> {
    if database.is_empty() {
        return Err(SearchError::EmptySequence { which: "database" }.into());
    }
    if query.is_empty() {
        return Err(SearchError::EmptySequence { which: "query" }.into());
    }

    let rows = query.len() + 1;
    let cols = database.len() + 1;
    let open = matrix.gap_exist();
    let extend = matrix.gap_extend();
    let floored = mode.floored();

    let mut scores = GotohScores {
        h: vec![0.0; rows * cols],
        up: vec![f64::NEG_INFINITY; rows * cols],
        left: vec![f64::NEG_INFINITY; rows * cols],
        cols,
    };
    let mut trace = TracebackMatrix::new(rows, cols);

    if mode == DpMode::AnchoredStart {
        for j in 1..cols {
            let v = -matrix.gap_cost(j);
            scores.h[j] = v;
            scores.left[j] = v;
            trace.set(
                0,
                j,
                TraceCell {
                    best: TracebackDir::Left,
                    left_extends: j > 1,
                    up_extends: false,
                },
            );
        }
        for i in 1..rows {
            let v = -matrix.gap_cost(i);
            scores.h[i * cols] = v;
            scores.up[i * cols] = v;
            trace.set(
                i,
                0,
                TraceCell {
                    best: TracebackDir::Up,
                    up_extends: i > 1,
                    left_extends: false,
                },
            );
        }
    }

    let mut best = (0.0f64, 0usize, 0usize);

    for i in 1..rows {
        let q = query[i - 1];
        for j in 1..cols {
            let idx = i * cols + j;
            let above = idx - cols;

            let up_open = scores.h[above] - open;
            let up_ext = scores.up[above] - extend;
            let up_extends = up_ext > up_open;
            let up = if up_extends { up_ext } else { up_open };

            let left_open = scores.h[idx - 1] - open;
            let left_ext = scores.left[idx - 1] - extend;
            let left_extends = left_ext > left_open;
            let left = if left_extends { left_ext } else { left_open };

            let diag = scores.h[above - 1] + matrix.score(database[j - 1], q);

            let (mut h, mut dir) = if diag >= up && diag >= left {
                (diag, TracebackDir::Diag)
            } else if up >= left {
                (up, TracebackDir::Up)
            } else {
                (left, TracebackDir::Left)
            };
            if floored && h <= 0.0 {
                h = 0.0;
                dir = TracebackDir::Stop;
            }

            scores.h[idx] = h;
            scores.up[idx] = up;
            scores.left[idx] = left;
            trace.set(
                i,
                j,
                TraceCell {
                    best: dir,
                    up_extends,
                    left_extends,
                },
            );

            if h > best.0 {
                best = (h, i, j);
            }
        }
    }

    let (end_row, end_col) = match mode {
        DpMode::Local | DpMode::AnchoredStart => (best.1, best.2),
        DpMode::AnchoredEnd => (rows - 1, cols - 1),
    };
    if scores.h(end_row, end_col) <= 0.0 {
        return Ok(TracedAlignment::empty());
    }

    traceback(&trace, &scores, end_row, end_col, database, query)
}
