//! Homopolymer-aware affine alignment for 454-style reads
//!
//! Insertion and deletion errors of these reads cluster inside homopolymer runs, so
//! opening a gap gets cheaper the deeper it sits in a run, while a gap that crosses
//! into a different run pays an extra transgression penalty. Each cell keeps the
//! best gap score under the standard (fixed) and position-specific (variable)
//! penalties and takes the larger one.
//!
//! Traceback recomputes every candidate transition and accepts it when it matches
//! the stored value within a tolerance, because several gap lengths can tie.

use super::result::{LocalAlignment, GAP};
use super::sw_gotoh::DpMode;
use super::traceback::{invariant, TracedAlignment};
use crate::config::HomopolymerConfig;
use crate::error::SearchError;
use crate::utils::matrix::ScoringMatrix;
use anyhow::Result;

/// Margin keeping the default transgression penalty strictly below the score range
const TRANSGRESSION_MARGIN: f64 = 1e-4;

/// Runs shorter than this decay in fixed thirds of the penalty range
const SHORT_RUN: usize = 3;

/// Per-position gap-open penalties and run-start flags of one sequence
#[derive(Debug, Clone, PartialEq)]
pub struct GapProfile {
    penalties: Vec<f64>,
    boundaries: Vec<bool>,
}

impl GapProfile {
    pub fn new(seq: &[u8], matrix: &ScoringMatrix) -> Self {
        let full = matrix.gap_exist();
        let floor = 2.0 * matrix.gap_extend();
        let range = (full - floor).max(0.0);

        let mut penalties = Vec::with_capacity(seq.len());
        let mut boundaries = Vec::with_capacity(seq.len());

        let mut start = 0;
        while start < seq.len() {
            let base = seq[start].to_ascii_uppercase();
            let run = seq[start..]
                .iter()
                .take_while(|b| b.to_ascii_uppercase() == base)
                .count();
            let step = if run < SHORT_RUN {
                range / SHORT_RUN as f64
            } else {
                range / run as f64
            };
            for k in 0..run {
                penalties.push((full - k as f64 * step).max(floor));
                boundaries.push(k == 0);
            }
            start += run;
        }

        Self {
            penalties,
            boundaries,
        }
    }

    pub fn penalties(&self) -> &[f64] {
        &self.penalties
    }

    pub fn boundaries(&self) -> &[bool] {
        &self.boundaries
    }

    #[inline]
    fn open(&self, pos: usize) -> f64 {
        self.penalties[pos]
    }

    #[inline]
    fn crosses(&self, pos: usize, transgression: f64) -> f64 {
        if self.boundaries[pos] {
            transgression
        } else {
            0.0
        }
    }
}

/// `min(2 * gap_extend, highest - lowest - 1e-4)`
pub fn default_transgression_penalty(matrix: &ScoringMatrix) -> f64 {
    (2.0 * matrix.gap_extend())
        .min(matrix.highest_score() - matrix.lowest_score() - TRANSGRESSION_MARGIN)
        .max(0.0)
}

/// Resolved homopolymer gap model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomopolymerModel {
    pub transgression_penalty: f64,
    pub tolerance: f64,
}

impl HomopolymerModel {
    pub fn new(matrix: &ScoringMatrix, config: &HomopolymerConfig) -> Self {
        Self {
            transgression_penalty: config
                .transgression_penalty
                .unwrap_or_else(|| default_transgression_penalty(matrix)),
            tolerance: config.traceback_tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    h: f64,
    up_fixed: f64,
    up_variable: f64,
    left_fixed: f64,
    left_variable: f64,
}

impl Cell {
    const BORDER: Cell = Cell {
        h: 0.0,
        up_fixed: f64::NEG_INFINITY,
        up_variable: f64::NEG_INFINITY,
        left_fixed: f64::NEG_INFINITY,
        left_variable: f64::NEG_INFINITY,
    };
}

/// Align under the homopolymer gap model
pub fn align(
    database: &[u8],
    query: &[u8],
    matrix: &ScoringMatrix,
    model: &HomopolymerModel,
    mode: DpMode,
) -> Result<LocalAlignment> {
    align_traced(database, query, matrix, model, mode).map(|t| t.alignment)
}

/// [`align`] plus the running score after each alignment column
pub fn align_traced(
    database: &[u8],
    query: &[u8],
    matrix: &ScoringMatrix,
    model: &HomopolymerModel,
    mode: DpMode,
) -> Result<TracedAlignment> {
    if database.is_empty() {
        return Err(SearchError::EmptySequence { which: "database" }.into());
    }
    if query.is_empty() {
        return Err(SearchError::EmptySequence { which: "query" }.into());
    }

    let dp = HomopolymerDp::fill(database, query, matrix, model, mode);
    let (end_row, end_col) = match mode {
        DpMode::Local | DpMode::AnchoredStart => dp.best,
        DpMode::AnchoredEnd => (query.len(), database.len()),
    };
    if dp.cell(end_row, end_col).h <= 0.0 {
        return Ok(TracedAlignment::empty());
    }
    dp.traceback(end_row, end_col)
}

struct HomopolymerDp<'a> {
    database: &'a [u8],
    query: &'a [u8],
    matrix: &'a ScoringMatrix,
    model: &'a HomopolymerModel,
    database_profile: GapProfile,
    query_profile: GapProfile,
    floored: bool,
    cells: Vec<Cell>,
    cols: usize,
    best: (usize, usize),
}

#[derive(Clone, Copy)]
enum State {
    Best,
    UpFixed,
    UpVariable,
    LeftFixed,
    LeftVariable,
}

impl<'a> HomopolymerDp<'a> {
    fn fill(
        database: &'a [u8],
        query: &'a [u8],
        matrix: &'a ScoringMatrix,
        model: &'a HomopolymerModel,
        mode: DpMode,
    ) -> Self {
        let rows = query.len() + 1;
        let cols = database.len() + 1;
        let mut dp = Self {
            database,
            query,
            matrix,
            model,
            database_profile: GapProfile::new(database, matrix),
            query_profile: GapProfile::new(query, matrix),
            floored: mode.floored(),
            cells: vec![Cell::BORDER; rows * cols],
            cols,
            best: (0, 0),
        };

        if mode == DpMode::AnchoredStart {
            for j in 1..cols {
                let v = -matrix.gap_cost(j);
                dp.cells[j].h = v;
                dp.cells[j].left_fixed = v;
            }
            for i in 1..rows {
                let v = -matrix.gap_cost(i);
                dp.cells[i * cols].h = v;
                dp.cells[i * cols].up_fixed = v;
            }
        }

        let open = matrix.gap_exist();
        let extend = matrix.gap_extend();
        let transgression = model.transgression_penalty;
        let mut best_score = 0.0f64;

        for i in 1..rows {
            let q = query[i - 1];
            let q_open = dp.query_profile.open(i - 1);
            let q_cross = dp.query_profile.crosses(i - 1, transgression);
            for j in 1..cols {
                let idx = i * cols + j;
                let above = dp.cells[idx - cols];
                let left = dp.cells[idx - 1];
                let diag = dp.cells[idx - cols - 1].h + matrix.score(database[j - 1], q);

                let up_fixed = (above.h - open).max(above.up_fixed - extend);
                let up_variable = (above.h - q_open).max(above.up_variable - extend - q_cross);

                let d_open = dp.database_profile.open(j - 1);
                let d_cross = dp.database_profile.crosses(j - 1, transgression);
                let left_fixed = (left.h - open).max(left.left_fixed - extend);
                let left_variable = (left.h - d_open).max(left.left_variable - extend - d_cross);

                let mut h = diag
                    .max(up_fixed)
                    .max(up_variable)
                    .max(left_fixed)
                    .max(left_variable);
                if dp.floored && h < 0.0 {
                    h = 0.0;
                }

                dp.cells[idx] = Cell {
                    h,
                    up_fixed,
                    up_variable,
                    left_fixed,
                    left_variable,
                };
                if h > best_score {
                    best_score = h;
                    dp.best = (i, j);
                }
            }
        }

        dp
    }

    #[inline]
    fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    #[inline]
    fn close(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.model.tolerance
    }

    fn traceback(&self, end_row: usize, end_col: usize) -> Result<TracedAlignment> {
        let open = self.matrix.gap_exist();
        let extend = self.matrix.gap_extend();
        let transgression = self.model.transgression_penalty;

        let mut columns = Vec::new();
        let mut running = Vec::new();
        let (mut i, mut j) = (end_row, end_col);
        let mut state = State::Best;

        loop {
            let here = self.cell(i, j);
            match state {
                State::Best => {
                    if (i == 0 && j == 0) || (self.floored && here.h.abs() <= self.model.tolerance) {
                        break;
                    }
                    if i > 0
                        && j > 0
                        && self.close(
                            here.h,
                            self.cell(i - 1, j - 1).h
                                + self.matrix.score(self.database[j - 1], self.query[i - 1]),
                        )
                    {
                        running.push(here.h);
                        columns.push((self.database[j - 1], self.query[i - 1]));
                        i -= 1;
                        j -= 1;
                    } else if i > 0 && self.close(here.h, here.up_fixed) {
                        state = State::UpFixed;
                    } else if i > 0 && self.close(here.h, here.up_variable) {
                        state = State::UpVariable;
                    } else if j > 0 && self.close(here.h, here.left_fixed) {
                        state = State::LeftFixed;
                    } else if j > 0 && self.close(here.h, here.left_variable) {
                        state = State::LeftVariable;
                    } else {
                        return Err(invariant(i, j, "best"));
                    }
                }
                State::UpFixed | State::UpVariable => {
                    if i == 0 {
                        return Err(invariant(i, j, "vertical gap"));
                    }
                    let above = self.cell(i - 1, j);
                    let (value, opened, extended) = match state {
                        State::UpFixed => (
                            here.up_fixed,
                            above.h - open,
                            above.up_fixed - extend,
                        ),
                        _ => (
                            here.up_variable,
                            above.h - self.query_profile.open(i - 1),
                            above.up_variable
                                - extend
                                - self.query_profile.crosses(i - 1, transgression),
                        ),
                    };
                    running.push(value);
                    columns.push((GAP, self.query[i - 1]));
                    if self.close(value, opened) {
                        state = State::Best;
                    } else if !self.close(value, extended) {
                        return Err(invariant(i, j, "vertical gap"));
                    }
                    i -= 1;
                }
                State::LeftFixed | State::LeftVariable => {
                    if j == 0 {
                        return Err(invariant(i, j, "horizontal gap"));
                    }
                    let left = self.cell(i, j - 1);
                    let (value, opened, extended) = match state {
                        State::LeftFixed => (
                            here.left_fixed,
                            left.h - open,
                            left.left_fixed - extend,
                        ),
                        _ => (
                            here.left_variable,
                            left.h - self.database_profile.open(j - 1),
                            left.left_variable
                                - extend
                                - self.database_profile.crosses(j - 1, transgression),
                        ),
                    };
                    running.push(value);
                    columns.push((self.database[j - 1], GAP));
                    if self.close(value, opened) {
                        state = State::Best;
                    } else if !self.close(value, extended) {
                        return Err(invariant(i, j, "horizontal gap"));
                    }
                    j -= 1;
                }
            }
        }

        let score = self.cell(end_row, end_col).h;
        Ok(TracedAlignment::from_reversed_columns(
            columns, running, score, i, j,
        ))
    }
}
