//! Query functions, one module per table.

pub mod completions;
pub mod plans;
pub mod progress;
