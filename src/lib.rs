//! Anchored seed-and-extend nucleotide similarity search
//!
//! A database of nucleotide sequences is indexed by fixed-length words. Query words
//! are looked up to collect seeds, seeds are clustered along diagonals into anchors,
//! and each anchor is extended by an affine-gap (optionally homopolymer-aware)
//! dynamic-programming aligner. Accepted alignments may be chained into composite
//! hits and reduced to the best-scoring ones.

pub mod error;
pub mod sequence;
pub mod utils;

pub mod align;
pub mod config;
pub mod post;
pub mod search;
pub mod seed;

pub use align::{Alignment, CompositeAlignment, PairwiseAlignment, SearchHit, Strand};
pub use config::SearchConfig;
pub use error::SearchError;
pub use search::{QueryResult, SearchEngine};
pub use sequence::{NamedSequence, NucleotideSequence};
pub use utils::matrix::ScoringMatrix;
