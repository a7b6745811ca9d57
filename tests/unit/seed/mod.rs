//! Unit tests for word indexing and seed clustering

pub mod clustering;
pub mod hash_index;
