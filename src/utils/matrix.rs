//! Nucleotide substitution matrix with affine gap penalties
//!
//! Symbols are indexed A=0, C=1, G=2, T=3 and everything else (N and other IUPAC
//! ambiguity codes) shares index 4. Lookups are case-insensitive.
//!
//! Gap penalties are stored as positive magnitudes and subtracted by the aligners.
//! A gap of length `L` costs `gap_exist + (L - 1) * gap_extend`.

use crate::error::SearchError;
use anyhow::Result;

/// Number of symbol classes in the table (ACGT + ambiguous)
pub const NUCL_ALPHABET_SIZE: usize = 5;

/// Index used for any symbol outside ACGT
pub const AMBIGUOUS_INDEX: usize = 4;

/// Map an ASCII nucleotide to its table index
#[inline(always)]
pub fn nucl_index(base: u8) -> usize {
    const TABLE: [u8; 256] = {
        let mut table = [AMBIGUOUS_INDEX as u8; 256];
        table[b'A' as usize] = 0;
        table[b'a' as usize] = 0;
        table[b'C' as usize] = 1;
        table[b'c' as usize] = 1;
        table[b'G' as usize] = 2;
        table[b'g' as usize] = 2;
        table[b'T' as usize] = 3;
        table[b't' as usize] = 3;
        table
    };
    TABLE[base as usize] as usize
}

fn uniform_table(match_score: f64, mismatch_score: f64) -> [[f64; NUCL_ALPHABET_SIZE]; NUCL_ALPHABET_SIZE] {
    let mut table = [[mismatch_score; NUCL_ALPHABET_SIZE]; NUCL_ALPHABET_SIZE];
    for (i, row) in table.iter_mut().enumerate().take(AMBIGUOUS_INDEX) {
        row[i] = match_score;
    }
    table
}

/// Immutable nucleotide scoring scheme shared read-only by every pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringMatrix {
    table: [[f64; NUCL_ALPHABET_SIZE]; NUCL_ALPHABET_SIZE],
    gap_exist: f64,
    gap_extend: f64,
    highest: f64,
    lowest: f64,
}

impl ScoringMatrix {
    /// Uniform match/mismatch scheme. Pairs involving an ambiguous symbol score as mismatches.
    pub fn new(match_score: f64, mismatch_score: f64, gap_exist: f64, gap_extend: f64) -> Result<Self> {
        Self::from_table(uniform_table(match_score, mismatch_score), gap_exist, gap_extend)
    }

    /// Full table, rows and columns in A, C, G, T, ambiguous order
    pub fn from_table(
        table: [[f64; NUCL_ALPHABET_SIZE]; NUCL_ALPHABET_SIZE],
        gap_exist: f64,
        gap_extend: f64,
    ) -> Result<Self> {
        if table.iter().flatten().any(|s| !s.is_finite()) {
            return Err(SearchError::matrix("substitution scores must be finite").into());
        }
        if !gap_extend.is_finite() || gap_extend <= 0.0 {
            return Err(SearchError::matrix(format!(
                "gap extend penalty must be positive, got {gap_extend}"
            ))
            .into());
        }
        if !gap_exist.is_finite() || gap_exist < gap_extend {
            return Err(SearchError::matrix(format!(
                "gap exist penalty {gap_exist} must be at least the gap extend penalty {gap_extend}"
            ))
            .into());
        }

        Ok(Self::from_parts(table, gap_exist, gap_extend))
    }

    fn from_parts(
        table: [[f64; NUCL_ALPHABET_SIZE]; NUCL_ALPHABET_SIZE],
        gap_exist: f64,
        gap_extend: f64,
    ) -> Self {
        let highest = table.iter().flatten().copied().fold(f64::NEG_INFINITY, f64::max);
        let lowest = table.iter().flatten().copied().fold(f64::INFINITY, f64::min);
        Self {
            table,
            gap_exist,
            gap_extend,
            highest,
            lowest,
        }
    }

    /// blastn-style defaults: +1/-3, gaps 5/2
    pub fn blastn() -> Self {
        Self::from_parts(uniform_table(1.0, -3.0), 5.0, 2.0)
    }

    /// Long-read defaults: +1/-1, gaps 3/1
    pub fn long_read() -> Self {
        Self::from_parts(uniform_table(1.0, -1.0), 3.0, 1.0)
    }

    #[inline(always)]
    pub fn score(&self, a: u8, b: u8) -> f64 {
        self.table[nucl_index(a)][nucl_index(b)]
    }

    #[inline(always)]
    pub fn gap_exist(&self) -> f64 {
        self.gap_exist
    }

    #[inline(always)]
    pub fn gap_extend(&self) -> f64 {
        self.gap_extend
    }

    pub fn highest_score(&self) -> f64 {
        self.highest
    }

    pub fn lowest_score(&self) -> f64 {
        self.lowest
    }

    /// Affine cost of a gap of `len` positions (zero for `len == 0`)
    pub fn gap_cost(&self, len: usize) -> f64 {
        if len == 0 {
            0.0
        } else {
            self.gap_exist + (len - 1) as f64 * self.gap_extend
        }
    }

    /// Score aligned columns (`b'-'` marks a gap) under the affine model
    pub fn score_columns(&self, database: &[u8], query: &[u8]) -> f64 {
        let mut score = 0.0;
        let mut in_db_gap = false;
        let mut in_query_gap = false;
        for (&d, &q) in database.iter().zip(query) {
            if d == b'-' {
                score -= if in_db_gap { self.gap_extend } else { self.gap_exist };
                in_db_gap = true;
                in_query_gap = false;
            } else if q == b'-' {
                score -= if in_query_gap { self.gap_extend } else { self.gap_exist };
                in_query_gap = true;
                in_db_gap = false;
            } else {
                score += self.score(d, q);
                in_db_gap = false;
                in_query_gap = false;
            }
        }
        score
    }
}

impl Default for ScoringMatrix {
    fn default() -> Self {
        Self::blastn()
    }
}
