//! Unit test infrastructure for anchorblast
//!
//! Tests are organized by pipeline stage:
//! - `seed/` - Word index and seed clustering
//! - `align/` - Dynamic-programming extension
//! - `post/` - Aggregation and hit selection
//! - `search/` - End-to-end searches

pub mod align;
pub mod helpers;
pub mod post;
pub mod search;
pub mod seed;
