//! Search configuration
//!
//! Every tunable of the pipeline is a plain constructor parameter collected here.
//! Nothing is read from the environment or from files.

use crate::error::SearchError;
use crate::seed::cluster::MIN_DIAGONAL_LENGTH;
use anyhow::Result;

/// Largest word size the 2-bit packed perfect hash supports
pub const MAX_WORD_SIZE: usize = 15;

/// How database words are sampled when building the hash index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashingPolicy {
    /// One word every `word_size` bases (SSAHA style)
    #[default]
    NonOverlapping,
    /// A word at every base
    Overlapping,
}

impl HashingPolicy {
    pub fn step_size(self, word_size: usize) -> usize {
        match self {
            HashingPolicy::NonOverlapping => word_size,
            HashingPolicy::Overlapping => 1,
        }
    }
}

impl std::str::FromStr for HashingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "non-overlapping" | "nonoverlapping" | "ssaha" => Ok(HashingPolicy::NonOverlapping),
            "overlapping" | "all" => Ok(HashingPolicy::Overlapping),
            _ => Err(format!(
                "Unknown hashing policy: {}. Use 'non-overlapping' or 'overlapping'",
                s
            )),
        }
    }
}

/// Number of best entries to keep plus the score margin that keeps near-ties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestHits {
    pub best: usize,
    /// Entries scoring within this distance of the top score are kept beyond `best`
    pub ambiguity_threshold: f64,
}

impl BestHits {
    pub fn new(best: usize, ambiguity_threshold: f64) -> Self {
        Self {
            best,
            ambiguity_threshold,
        }
    }

    fn validate(&self, what: &str) -> Result<()> {
        if self.best == 0 {
            return Err(SearchError::config(format!("{what}: best count must be at least 1")).into());
        }
        if !self.ambiguity_threshold.is_finite() || self.ambiguity_threshold < 0.0 {
            return Err(SearchError::config(format!(
                "{what}: ambiguity threshold must be finite and non-negative"
            ))
            .into());
        }
        Ok(())
    }
}

/// Hash index construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HashConfig {
    pub word_size: usize,
    /// Multiple of the chance expectation at which a word counts as low-complexity.
    /// `None` disables masking.
    pub low_complexity_cutoff: Option<f64>,
    pub policy: HashingPolicy,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            word_size: 11,
            low_complexity_cutoff: Some(50.0),
            policy: HashingPolicy::NonOverlapping,
        }
    }
}

impl HashConfig {
    pub fn step_size(&self) -> usize {
        self.policy.step_size(self.word_size)
    }

    pub fn validate(&self) -> Result<()> {
        if self.word_size == 0 {
            return Err(SearchError::InvalidWordSize.into());
        }
        if self.word_size > MAX_WORD_SIZE {
            return Err(SearchError::WordSizeTooLarge {
                word_size: self.word_size,
                max: MAX_WORD_SIZE,
            }
            .into());
        }
        if let Some(cutoff) = self.low_complexity_cutoff {
            if !cutoff.is_finite() || cutoff <= 0.0 {
                return Err(SearchError::config("low-complexity cutoff must be positive").into());
            }
        }
        Ok(())
    }
}

/// Seed clustering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClusterStrategy {
    #[default]
    BestDiagonal,
    /// Chain collinear diagonals across large gaps (introns) before ranking
    BestCumulativeDiagonal,
}

impl std::str::FromStr for ClusterStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "diagonal" | "best-diagonal" => Ok(ClusterStrategy::BestDiagonal),
            "cumulative" | "best-cumulative-diagonal" => Ok(ClusterStrategy::BestCumulativeDiagonal),
            _ => Err(format!(
                "Unknown cluster strategy: {}. Use 'diagonal' or 'cumulative'",
                s
            )),
        }
    }
}

/// Seed clustering parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedConfig {
    pub strategy: ClusterStrategy,
    /// Minimum number of words on one diagonal
    pub minimum_diagonal_length: usize,
    /// Offset tolerance for merging seeds into one diagonal
    pub max_offset: usize,
    /// Seeds (or cumulative seeds) to hand to the extender; `None` returns all
    pub best: Option<BestHits>,
    /// Largest database distance between chained diagonals (cumulative strategy only)
    pub maximum_distance: Option<usize>,
    /// Minimum summed word count of a cumulative seed
    pub minimum_cumulative_diagonal_length: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            strategy: ClusterStrategy::BestDiagonal,
            minimum_diagonal_length: 2,
            max_offset: 3,
            best: Some(BestHits::new(20, 1.0)),
            maximum_distance: None,
            minimum_cumulative_diagonal_length: 3,
        }
    }
}

impl SeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.minimum_diagonal_length == 0 {
            return Err(SearchError::config("minimum diagonal length must be at least 1").into());
        }
        if self.strategy == ClusterStrategy::BestCumulativeDiagonal
            && self.minimum_diagonal_length < MIN_DIAGONAL_LENGTH
        {
            return Err(SearchError::config(format!(
                "cumulative chaining needs a minimum diagonal length of at least {MIN_DIAGONAL_LENGTH}"
            ))
            .into());
        }
        if let Some(best) = &self.best {
            best.validate("seed selection")?;
        }
        Ok(())
    }
}

/// Dynamic-programming strategy used to extend an anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtenderKind {
    /// Affine-gap local alignment inside a bounded window
    #[default]
    SmithWatermanGotoh,
    /// Windowed local alignment with homopolymer-aware gap penalties (454-style reads)
    HomopolymerSmithWatermanGotoh,
    /// Chunked 5'/3' extension for long queries
    BandedSmithWatermanGotoh,
    /// Chunked extension with homopolymer-aware gap penalties
    BandedHomopolymerSmithWatermanGotoh,
}

impl ExtenderKind {
    pub fn is_homopolymer_aware(self) -> bool {
        matches!(
            self,
            ExtenderKind::HomopolymerSmithWatermanGotoh
                | ExtenderKind::BandedHomopolymerSmithWatermanGotoh
        )
    }
}

impl std::str::FromStr for ExtenderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "swg" | "smith-waterman-gotoh" => Ok(ExtenderKind::SmithWatermanGotoh),
            "454" | "homopolymer" => Ok(ExtenderKind::HomopolymerSmithWatermanGotoh),
            "banded" => Ok(ExtenderKind::BandedSmithWatermanGotoh),
            "banded-454" | "banded-homopolymer" => Ok(ExtenderKind::BandedHomopolymerSmithWatermanGotoh),
            _ => Err(format!(
                "Unknown extender: {}. Use 'swg', '454', 'banded' or 'banded-454'",
                s
            )),
        }
    }
}

/// Chunked extension parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandedConfig {
    /// Edge length of each dynamic-programming chunk
    pub chunk_size: usize,
    /// Columns re-evaluated by the next chunk; also the edge margin that decides
    /// whether a chunk reached the natural end of the alignment
    pub overlap: usize,
    /// Queries up to this length use the windowed aligner instead
    pub activation_threshold: usize,
}

impl Default for BandedConfig {
    fn default() -> Self {
        Self {
            chunk_size: 200,
            overlap: 20,
            activation_threshold: 1000,
        }
    }
}

/// Homopolymer-aware gap model parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomopolymerConfig {
    /// Penalty for a gap crossing into a different run. `None` derives it from the matrix.
    pub transgression_penalty: Option<f64>,
    /// Tolerance used by traceback to match recomputed running totals
    pub traceback_tolerance: f64,
    /// Final hit selection used instead of `SearchConfig::best_hits` for homopolymer-aware runs
    pub best: Option<BestHits>,
}

impl Default for HomopolymerConfig {
    fn default() -> Self {
        Self {
            transgression_penalty: None,
            traceback_tolerance: 1e-4,
            best: None,
        }
    }
}

/// Ungapped pre-filter gating the expensive extension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UngappedConfig {
    /// Consecutive non-improving steps before a direction stops
    pub test_length: usize,
    /// Minimum ungapped score needed to run the gapped extension
    pub minimum_score: f64,
}

impl Default for UngappedConfig {
    fn default() -> Self {
        Self {
            test_length: 10,
            minimum_score: 16.0,
        }
    }
}

impl UngappedConfig {
    pub fn passes(&self, ungapped_score: f64) -> bool {
        ungapped_score >= self.minimum_score
    }
}

/// Extension stage parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtensionConfig {
    pub kind: ExtenderKind,
    /// Upper bound on the window shift on each side of the anchor
    pub max_window_shift: Option<usize>,
    pub banded: BandedConfig,
    pub homopolymer: HomopolymerConfig,
    pub ungapped: Option<UngappedConfig>,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            kind: ExtenderKind::SmithWatermanGotoh,
            max_window_shift: Some(1000),
            banded: BandedConfig::default(),
            homopolymer: HomopolymerConfig::default(),
            ungapped: None,
        }
    }
}

impl ExtensionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.banded.chunk_size == 0 || self.banded.overlap >= self.banded.chunk_size {
            return Err(SearchError::config(format!(
                "banded chunk size {} must be positive and exceed the overlap {}",
                self.banded.chunk_size, self.banded.overlap
            ))
            .into());
        }
        let tolerance = self.homopolymer.traceback_tolerance;
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(SearchError::config("traceback tolerance must be positive").into());
        }
        if let Some(penalty) = self.homopolymer.transgression_penalty {
            if !penalty.is_finite() || penalty < 0.0 {
                return Err(SearchError::config("transgression penalty must be non-negative").into());
            }
        }
        if let Some(best) = &self.homopolymer.best {
            best.validate("homopolymer hit selection")?;
        }
        if let Some(ungapped) = &self.ungapped {
            if ungapped.test_length == 0 {
                return Err(SearchError::config("ungapped test length must be at least 1").into());
            }
            if !ungapped.minimum_score.is_finite() {
                return Err(SearchError::config("ungapped minimum score must be finite").into());
            }
        }
        Ok(())
    }
}

/// Partial-alignment aggregation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationConfig {
    /// Largest query overlap tolerated between consecutive segments
    pub maximum_overlap: usize,
    /// Largest gap between consecutive segments in both coordinates
    pub maximum_distance: Option<usize>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            maximum_overlap: 10,
            maximum_distance: Some(10_000),
        }
    }
}

/// Complete search configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub hash: HashConfig,
    pub seed: SeedConfig,
    pub extension: ExtensionConfig,
    /// Significance cutoff; `None` accepts every alignment
    pub minimum_score: Option<f64>,
    /// Final best-hit selection
    pub best_hits: Option<BestHits>,
    /// Merge collinear partial alignments into composite hits
    pub aggregation: Option<AggregationConfig>,
    /// Skip seeds inside the database span of the previously accepted alignment
    pub skip_overlapping_seeds: bool,
    /// Queries between progress notifications (0 disables them)
    pub progress_interval: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hash: HashConfig::default(),
            seed: SeedConfig::default(),
            extension: ExtensionConfig::default(),
            minimum_score: Some(20.0),
            best_hits: None,
            aggregation: None,
            skip_overlapping_seeds: true,
            progress_interval: 1000,
        }
    }
}

impl SearchConfig {
    /// Long homopolymer-prone reads: overlapping words, chunked homopolymer-aware extension
    pub fn long_read() -> Self {
        Self {
            hash: HashConfig {
                word_size: 12,
                policy: HashingPolicy::Overlapping,
                ..HashConfig::default()
            },
            extension: ExtensionConfig {
                kind: ExtenderKind::BandedHomopolymerSmithWatermanGotoh,
                ungapped: Some(UngappedConfig::default()),
                ..ExtensionConfig::default()
            },
            best_hits: Some(BestHits::new(1, 5.0)),
            ..Self::default()
        }
    }

    /// Transcripts against genomic sequence: cumulative diagonals and composite hits
    pub fn spliced() -> Self {
        Self {
            seed: SeedConfig {
                strategy: ClusterStrategy::BestCumulativeDiagonal,
                maximum_distance: Some(10_000),
                ..SeedConfig::default()
            },
            aggregation: Some(AggregationConfig::default()),
            best_hits: Some(BestHits::new(1, 5.0)),
            ..Self::default()
        }
    }

    /// Hit selection in effect for the configured extender
    pub fn effective_best_hits(&self) -> Option<BestHits> {
        if self.extension.kind.is_homopolymer_aware() && self.extension.homopolymer.best.is_some() {
            self.extension.homopolymer.best
        } else {
            self.best_hits
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.hash.validate()?;
        self.seed.validate()?;
        self.extension.validate()?;
        if let Some(min) = self.minimum_score {
            if !min.is_finite() {
                return Err(SearchError::config("minimum score must be finite").into());
            }
        }
        if let Some(best) = &self.best_hits {
            best.validate("hit selection")?;
        }
        Ok(())
    }
}
