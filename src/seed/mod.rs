//! Word indexing, seed collection and diagonal clustering

pub mod cluster;
pub mod collector;
pub mod hash_index;

pub use cluster::{
    build_clusterer, BestCumulativeDiagonal, BestDiagonal, CumulativeSeed, DiagonalSeed,
    SeedClusterer,
};
pub use collector::{collect_seeds, RawSeed};
pub use hash_index::{hash_word, unhash_word, HashIndex, Occurrence, WordGeometry, Words};
