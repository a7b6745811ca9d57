use super::result::{LocalAlignment, GAP};
use crate::error::SearchError;
use anyhow::Result;

/// Direction for traceback in DP matrix
///
/// Rows index the query, columns the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TracebackDir {
    /// Diagonal (match/mismatch)
    Diag,
    /// Up (gap in database / insertion in query)
    Up,
    /// Left (gap in query / deletion from query)
    Left,
    /// Stop (end of alignment)
    #[default]
    Stop,
}

/// Per-cell traceback state of the affine recurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceCell {
    /// Which recurrence produced the best score of the cell
    pub best: TracebackDir,
    /// The vertical gap ending here extends the one ending in the cell above
    pub up_extends: bool,
    /// The horizontal gap ending here extends the one ending in the cell to the left
    pub left_extends: bool,
}

/// Traceback matrix for storing alignment path
pub struct TracebackMatrix {
    data: Vec<TraceCell>,
    cols: usize,
}

impl TracebackMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![TraceCell::default(); rows * cols],
            cols,
        }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> TraceCell {
        self.data[row * self.cols + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, cell: TraceCell) {
        self.data[row * self.cols + col] = cell;
    }
}

/// Alignment recovered by traceback together with the running score after each column
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TracedAlignment {
    pub alignment: LocalAlignment,
    /// `running_scores[k]` is the score of the first `k + 1` columns
    pub running_scores: Vec<f64>,
}

impl TracedAlignment {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble from columns collected end-to-start; `start_row`/`start_col` are the
    /// 0-based query/database positions of the first column
    pub(crate) fn from_reversed_columns(
        mut columns: Vec<(u8, u8)>,
        mut running: Vec<f64>,
        score: f64,
        start_row: usize,
        start_col: usize,
    ) -> Self {
        if columns.is_empty() {
            return Self::empty();
        }
        columns.reverse();
        running.reverse();
        let (database_aligned, query_aligned): (Vec<u8>, Vec<u8>) = columns.into_iter().unzip();
        let database_bases = database_aligned.iter().filter(|&&b| b != GAP).count();
        let query_bases = query_aligned.iter().filter(|&&b| b != GAP).count();
        Self {
            alignment: LocalAlignment {
                score,
                database_start: start_col + 1,
                database_end: start_col + database_bases,
                query_start: start_row + 1,
                query_end: start_row + query_bases,
                database_aligned,
                query_aligned,
            },
            running_scores: running,
        }
    }

    /// Mirror an alignment computed on reversed sequences of lengths
    /// `database_len`/`query_len` back onto the forward sequences
    pub fn reversed(self, database_len: usize, query_len: usize) -> Self {
        if self.alignment.is_empty() {
            return self;
        }
        let LocalAlignment {
            mut database_aligned,
            mut query_aligned,
            score,
            database_start,
            database_end,
            query_start,
            query_end,
        } = self.alignment;
        database_aligned.reverse();
        query_aligned.reverse();

        // A forward prefix is a reversed suffix: total minus the reversed prefix before it
        let k = self.running_scores.len();
        let running_scores = (1..=k)
            .map(|p| {
                let before = if p == k { 0.0 } else { self.running_scores[k - p - 1] };
                score - before
            })
            .collect();

        Self {
            alignment: LocalAlignment {
                database_aligned,
                query_aligned,
                score,
                database_start: database_len + 1 - database_end,
                database_end: database_len + 1 - database_start,
                query_start: query_len + 1 - query_end,
                query_end: query_len + 1 - query_start,
            },
            running_scores,
        }
    }
}

/// Score values of one cell of the affine recurrence, kept to report running totals
pub trait AffineScores {
    fn h(&self, row: usize, col: usize) -> f64;
    fn up(&self, row: usize, col: usize) -> f64;
    fn left(&self, row: usize, col: usize) -> f64;
}

#[derive(Clone, Copy)]
enum State {
    Best,
    Up,
    Left,
}

/// Follow stored directions from `(end_row, end_col)` back to a `Stop` cell
pub fn traceback<S: AffineScores>(
    matrix: &TracebackMatrix,
    scores: &S,
    end_row: usize,
    end_col: usize,
    database: &[u8],
    query: &[u8],
) -> Result<TracedAlignment> {
    let mut columns = Vec::new();
    let mut running = Vec::new();
    let mut row = end_row;
    let mut col = end_col;
    let mut state = State::Best;

    loop {
        let cell = matrix.get(row, col);
        match state {
            State::Best => match cell.best {
                TracebackDir::Stop => break,
                TracebackDir::Diag => {
                    if row == 0 || col == 0 {
                        return Err(invariant(row, col, "diagonal"));
                    }
                    running.push(scores.h(row, col));
                    columns.push((database[col - 1], query[row - 1]));
                    row -= 1;
                    col -= 1;
                }
                TracebackDir::Up => state = State::Up,
                TracebackDir::Left => state = State::Left,
            },
            State::Up => {
                if row == 0 {
                    return Err(invariant(row, col, "vertical gap"));
                }
                running.push(scores.up(row, col));
                columns.push((GAP, query[row - 1]));
                if !cell.up_extends {
                    state = State::Best;
                }
                row -= 1;
            }
            State::Left => {
                if col == 0 {
                    return Err(invariant(row, col, "horizontal gap"));
                }
                running.push(scores.left(row, col));
                columns.push((database[col - 1], GAP));
                if !cell.left_extends {
                    state = State::Best;
                }
                col -= 1;
            }
        }
    }

    let score = running.first().copied().unwrap_or(0.0);
    Ok(TracedAlignment::from_reversed_columns(
        columns, running, score, row, col,
    ))
}

pub(crate) fn invariant(row: usize, col: usize, state: &'static str) -> anyhow::Error {
    SearchError::TracebackInvariant { row, col, state }.into()
}
