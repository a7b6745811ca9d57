//! Unit tests for anchored extension

pub mod extension;
pub mod homopolymer;
