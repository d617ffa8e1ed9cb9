//! Core of the 30-day plan pipeline.
//!
//! [`plan`] turns a topic into a validated 30-day plan through a
//! [`provider::GenerationProvider`]; [`progress`] derives streaks and
//! summaries from completion history.

pub mod error;
pub mod plan;
pub mod progress;
pub mod provider;

pub use error::{FailureKind, MalformedResponse, PipelineError, SchemaViolation};
