//! Seed clustering
//!
//! Raw word hits are grouped by diagonal (`database_position - query_position`) so that
//! the extender sees one anchor per collinear run instead of one per word.
//! [`BestCumulativeDiagonal`] additionally chains collinear diagonals on the same
//! sequence, which lets exon-like hits separated by large gaps rank together.

use super::collector::RawSeed;
use super::hash_index::WordGeometry;
use crate::config::{BestHits, ClusterStrategy, SeedConfig};
use crate::error::SearchError;
use crate::utils::ranking::rank_with_ambiguity;
use anyhow::Result;

/// Shortest diagonal (in words) allowed to enter cumulative chaining
pub const MIN_DIAGONAL_LENGTH: usize = 2;

/// Representative seed of one diagonal cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagonalSeed {
    pub sequence_id: u16,
    /// Lowest database position in the cluster (0-based)
    pub database_position: usize,
    /// Query position paired with `database_position`
    pub query_position: usize,
    pub offset: i64,
    /// Number of words on the diagonal
    pub score: usize,
    /// Last database base covered by the cluster (0-based, inclusive)
    pub database_end_position: usize,
    /// Last query base covered by the cluster (0-based, inclusive)
    pub query_end_position: usize,
}

impl DiagonalSeed {
    fn from_cluster(representative: RawSeed, score: usize, geometry: WordGeometry) -> Self {
        let span = (score - 1) * geometry.step_size + geometry.word_size - 1;
        Self {
            sequence_id: representative.sequence_id,
            database_position: representative.database_position,
            query_position: representative.query_position,
            offset: representative.offset(),
            score,
            database_end_position: representative.database_position + span,
            query_end_position: representative.query_position + span,
        }
    }
}

/// Collinear diagonals of one sequence, ascending in both coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativeSeed {
    members: Vec<DiagonalSeed>,
    score: usize,
}

impl CumulativeSeed {
    fn new(first: DiagonalSeed) -> Self {
        Self {
            score: first.score,
            members: vec![first],
        }
    }

    pub fn sequence_id(&self) -> u16 {
        self.members[0].sequence_id
    }

    /// Sum of member word counts
    pub fn score(&self) -> usize {
        self.score
    }

    pub fn members(&self) -> &[DiagonalSeed] {
        &self.members
    }

    fn tail(&self) -> &DiagonalSeed {
        &self.members[self.members.len() - 1]
    }

    fn accepts(&self, candidate: &DiagonalSeed, maximum_distance: Option<usize>) -> bool {
        let tail = self.tail();
        candidate.sequence_id == tail.sequence_id
            && candidate.database_position > tail.database_position
            && candidate.query_position > tail.query_position
            && maximum_distance.map_or(true, |max| {
                candidate
                    .database_position
                    .saturating_sub(tail.database_end_position)
                    <= max
            })
    }

    fn push(&mut self, seed: DiagonalSeed) {
        self.score += seed.score;
        self.members.push(seed);
    }
}

/// Groups raw seeds into ranked diagonal anchors
pub trait SeedClusterer: Send + Sync {
    fn cluster(&self, seeds: &[RawSeed], geometry: WordGeometry) -> Result<Vec<DiagonalSeed>>;
}

/// Construct the clusterer selected by `config.strategy`
pub fn build_clusterer(config: &SeedConfig) -> Box<dyn SeedClusterer> {
    let diagonal = BestDiagonal {
        minimum_diagonal_length: config.minimum_diagonal_length,
        max_offset: config.max_offset,
        best: config.best,
    };
    match config.strategy {
        ClusterStrategy::BestDiagonal => Box::new(diagonal),
        ClusterStrategy::BestCumulativeDiagonal => Box::new(BestCumulativeDiagonal {
            diagonal: BestDiagonal {
                best: None,
                ..diagonal
            },
            maximum_distance: config.maximum_distance,
            minimum_cumulative_diagonal_length: config.minimum_cumulative_diagonal_length,
            best: config.best,
        }),
    }
}

/// Clusters seeds on (nearly) the same diagonal and keeps the longest diagonals
#[derive(Debug, Clone, Copy)]
pub struct BestDiagonal {
    pub minimum_diagonal_length: usize,
    /// Largest offset step between consecutive seeds of one cluster
    pub max_offset: usize,
    pub best: Option<BestHits>,
}

impl BestDiagonal {
    /// Every qualifying diagonal, unranked, in (sequence, offset) order
    pub fn diagonals(&self, seeds: &[RawSeed], geometry: WordGeometry) -> Vec<DiagonalSeed> {
        let mut sorted = seeds.to_vec();
        sorted.sort_unstable_by_key(|s| (s.sequence_id, s.offset(), s.database_position));

        let mut clusters = Vec::new();
        let mut iter = sorted.into_iter();
        let Some(first) = iter.next() else {
            return clusters;
        };

        let mut representative = first;
        let mut last_offset = first.offset();
        let mut count = 1usize;

        for seed in iter {
            let offset = seed.offset();
            if seed.sequence_id == representative.sequence_id
                && offset - last_offset <= self.max_offset as i64
            {
                if seed.database_position < representative.database_position {
                    representative = seed;
                }
                count += 1;
            } else {
                if count >= self.minimum_diagonal_length {
                    clusters.push(DiagonalSeed::from_cluster(representative, count, geometry));
                }
                representative = seed;
                count = 1;
            }
            last_offset = offset;
        }
        if count >= self.minimum_diagonal_length {
            clusters.push(DiagonalSeed::from_cluster(representative, count, geometry));
        }

        clusters
    }
}

impl SeedClusterer for BestDiagonal {
    fn cluster(&self, seeds: &[RawSeed], geometry: WordGeometry) -> Result<Vec<DiagonalSeed>> {
        let diagonals = self.diagonals(seeds, geometry);
        Ok(rank_with_ambiguity(diagonals, |d| d.score as f64, self.best))
    }
}

/// Chains collinear diagonals before ranking, then hands back the member diagonals
#[derive(Debug, Clone, Copy)]
pub struct BestCumulativeDiagonal {
    /// Per-diagonal clustering; its own `best` is ignored
    pub diagonal: BestDiagonal,
    pub maximum_distance: Option<usize>,
    pub minimum_cumulative_diagonal_length: usize,
    pub best: Option<BestHits>,
}

impl BestCumulativeDiagonal {
    /// Ranked cumulative seeds that pass the minimum summed length
    pub fn cumulative_seeds(
        &self,
        seeds: &[RawSeed],
        geometry: WordGeometry,
    ) -> Result<Vec<CumulativeSeed>> {
        let mut diagonals = self.diagonal.diagonals(seeds, geometry);

        if let Some(short) = diagonals.iter().find(|d| d.score < MIN_DIAGONAL_LENGTH) {
            return Err(SearchError::cluster(format!(
                "diagonal at {}:{} has length {} below the minimum of {}",
                short.sequence_id, short.database_position, short.score, MIN_DIAGONAL_LENGTH
            ))
            .into());
        }

        diagonals.sort_unstable_by_key(|d| (d.sequence_id, d.database_position, d.query_position));

        let mut chains: Vec<CumulativeSeed> = Vec::new();
        let mut open_from = 0usize;
        for diagonal in diagonals {
            if chains
                .last()
                .is_some_and(|c| c.sequence_id() != diagonal.sequence_id)
            {
                open_from = chains.len();
            }

            let mut target: Option<usize> = None;
            for (i, chain) in chains.iter().enumerate().skip(open_from) {
                if chain.accepts(&diagonal, self.maximum_distance)
                    && target.map_or(true, |t| chain.score() > chains[t].score())
                {
                    target = Some(i);
                }
            }

            match target {
                Some(i) => chains[i].push(diagonal),
                None => chains.push(CumulativeSeed::new(diagonal)),
            }
        }

        chains.retain(|c| c.score() >= self.minimum_cumulative_diagonal_length);
        Ok(rank_with_ambiguity(chains, |c| c.score() as f64, self.best))
    }
}

impl SeedClusterer for BestCumulativeDiagonal {
    fn cluster(&self, seeds: &[RawSeed], geometry: WordGeometry) -> Result<Vec<DiagonalSeed>> {
        let chains = self.cumulative_seeds(seeds, geometry)?;
        Ok(chains.into_iter().flat_map(|c| c.members).collect())
    }
}
