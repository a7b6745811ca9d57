use super::result::Anchor;
use crate::config::UngappedConfig;
use crate::utils::matrix::ScoringMatrix;

/// Cheap gap-free extension used to decide whether an anchor deserves dynamic programming.
///
/// # Index Semantics
/// - The 3' walk starts at the anchor itself, so the anchor is scored exactly once
/// - The 5' walk starts one base upstream of the anchor
/// - Each walk stops after `test_length` consecutive steps without a new best score,
///   or when either sequence runs out
#[derive(Debug, Clone, Copy)]
pub struct UngappedExtension {
    config: UngappedConfig,
}

impl UngappedExtension {
    pub fn new(config: UngappedConfig) -> Self {
        Self { config }
    }

    /// Best 3' score plus best 5' score
    pub fn score(
        &self,
        database: &[u8],
        query: &[u8],
        matrix: &ScoringMatrix,
        anchor: Anchor,
    ) -> f64 {
        let downstream = database[anchor.database_position..]
            .iter()
            .zip(&query[anchor.query_position..]);
        let upstream = database[..anchor.database_position]
            .iter()
            .rev()
            .zip(query[..anchor.query_position].iter().rev());

        self.walk(downstream, matrix) + self.walk(upstream, matrix)
    }

    /// Whether the anchor passes the configured minimum score
    pub fn passes(
        &self,
        database: &[u8],
        query: &[u8],
        matrix: &ScoringMatrix,
        anchor: Anchor,
    ) -> bool {
        self.config
            .passes(self.score(database, query, matrix, anchor))
    }

    fn walk<'a, I>(&self, pairs: I, matrix: &ScoringMatrix) -> f64
    where
        I: Iterator<Item = (&'a u8, &'a u8)>,
    {
        let mut current = 0.0;
        let mut best = 0.0;
        let mut since_best = 0;
        for (&d, &q) in pairs {
            current += matrix.score(d, q);
            if current > best {
                best = current;
                since_best = 0;
            } else {
                since_best += 1;
                if since_best >= self.config.test_length {
                    break;
                }
            }
        }
        best
    }
}
