pub mod matrix;
pub mod ranking;
