//! End-to-end search tests

pub mod engine;
