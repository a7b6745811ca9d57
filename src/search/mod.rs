//! Query orchestration over a shared database index

pub mod engine;
pub mod progress;

pub use engine::{QueryResult, SearchEngine};
pub use progress::{BarProgress, LogProgress, NoProgress, ProgressReporter};
