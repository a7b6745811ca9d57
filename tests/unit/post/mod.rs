//! Unit tests for post-processing

pub mod aggregation;
pub mod best_hits;
