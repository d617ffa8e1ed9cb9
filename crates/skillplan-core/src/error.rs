//! Failure taxonomy for the plan pipeline.
//!
//! Every stage returns [`PipelineError`]. Callers match on the variant (or on
//! [`PipelineError::kind`]) to decide whether a fresh attempt is worthwhile;
//! the pipeline itself never retries and never returns a partial plan.

use thiserror::Error;

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidArgument,
    ProviderUnavailable,
    MalformedResponse,
    SchemaViolation,
}

/// Errors produced by plan generation, sanitization and validation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad caller input. Retrying with the same input cannot succeed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The provider could not be reached, timed out, or answered with a
    /// non-success status.
    #[error("generation provider unavailable{}: {message}", status_suffix(.status))]
    ProviderUnavailable {
        status: Option<u16>,
        message: String,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(#[from] MalformedResponse),

    #[error("schema violation: {0}")]
    SchemaViolation(#[from] SchemaViolation),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

impl PipelineError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidArgument(_) => FailureKind::InvalidArgument,
            Self::ProviderUnavailable { .. } => FailureKind::ProviderUnavailable,
            Self::MalformedResponse(_) => FailureKind::MalformedResponse,
            Self::SchemaViolation(_) => FailureKind::SchemaViolation,
        }
    }

    /// Whether a fresh call with the same input could succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_))
    }
}

/// The provider text could not be turned into a JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedResponse {
    #[error("no JSON array boundary found")]
    NoArrayBoundary,

    /// `position` is the byte offset into the sanitized candidate text.
    #[error("invalid JSON at line {line}, column {column} (byte {position}): {message}")]
    InvalidJson {
        message: String,
        line: usize,
        column: usize,
        position: usize,
    },

    #[error("response envelope is not valid JSON: {0}")]
    InvalidEnvelope(String),

    #[error("response envelope is missing {0}")]
    MissingEnvelopeField(&'static str),
}

/// The parsed JSON does not have the shape of a 30-day plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("expected a JSON array of day objects")]
    NotAnArray,

    #[error("plan must contain exactly {expected} days (got {observed} days)")]
    DayCount { expected: usize, observed: usize },

    #[error("element {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("element {index} has no \"day\" key")]
    MissingDay { index: usize },

    #[error("element {index} has invalid day {value} (expected an integer from 1 to {max})")]
    InvalidDay {
        index: usize,
        value: String,
        max: usize,
    },

    #[error("day {day} appears more than once")]
    DuplicateDay { day: u32 },

    #[error("day {day} must have a {field:?} key")]
    MissingField { day: u32, field: &'static str },

    #[error("day {day}: {field:?} must be an array")]
    NotAList { day: u32, field: &'static str },

    #[error("day {day} must have {min}-{max} {field} (has {observed})")]
    Count {
        day: u32,
        field: &'static str,
        observed: usize,
        min: usize,
        max: usize,
    },

    #[error("day {day}: task {task} must have {min}-{max} resources (has {observed})")]
    TaskResourceCount {
        day: u32,
        task: usize,
        observed: usize,
        min: usize,
        max: usize,
    },

    #[error("day {day}: {field} entry {index} must be a non-empty string")]
    InvalidEntry {
        day: u32,
        field: &'static str,
        index: usize,
    },

    #[error("day {day}: task {index} must be a string or an object with a description")]
    InvalidTask { day: u32, index: usize },

    #[error("day {day}: title must be a string")]
    InvalidTitle { day: u32 },
}

impl SchemaViolation {
    /// The day number the violation concerns, when one was already known.
    pub fn day(&self) -> Option<u32> {
        match self {
            Self::DuplicateDay { day }
            | Self::MissingField { day, .. }
            | Self::NotAList { day, .. }
            | Self::Count { day, .. }
            | Self::TaskResourceCount { day, .. }
            | Self::InvalidEntry { day, .. }
            | Self::InvalidTask { day, .. }
            | Self::InvalidTitle { day } => Some(*day),
            Self::NotAnArray
            | Self::DayCount { .. }
            | Self::NotAnObject { .. }
            | Self::MissingDay { .. }
            | Self::InvalidDay { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_retry_posture() {
        let invalid = PipelineError::invalid_argument("topic must not be empty");
        assert_eq!(invalid.kind(), FailureKind::InvalidArgument);
        assert!(!invalid.is_retryable());

        let unavailable = PipelineError::ProviderUnavailable {
            status: Some(503),
            message: "overloaded".into(),
        };
        assert_eq!(unavailable.kind(), FailureKind::ProviderUnavailable);
        assert!(unavailable.is_retryable());

        let malformed = PipelineError::from(MalformedResponse::NoArrayBoundary);
        assert_eq!(malformed.kind(), FailureKind::MalformedResponse);
        assert!(malformed.is_retryable());

        let schema = PipelineError::from(SchemaViolation::NotAnArray);
        assert_eq!(schema.kind(), FailureKind::SchemaViolation);
        assert!(schema.is_retryable());
    }

    #[test]
    fn provider_status_in_message() {
        let err = PipelineError::ProviderUnavailable {
            status: Some(429),
            message: "rate limited".into(),
        };
        assert_eq!(
            err.to_string(),
            "generation provider unavailable (HTTP 429): rate limited"
        );

        let err = PipelineError::ProviderUnavailable {
            status: None,
            message: "connection refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "generation provider unavailable: connection refused"
        );
    }

    #[test]
    fn day_count_message_cites_observed() {
        let err = SchemaViolation::DayCount {
            expected: 30,
            observed: 29,
        };
        assert!(err.to_string().contains("got 29 days"));
        assert_eq!(err.day(), None);
    }

    #[test]
    fn count_message_names_day() {
        let err = SchemaViolation::Count {
            day: 12,
            field: "tasks",
            observed: 5,
            min: 2,
            max: 4,
        };
        assert_eq!(err.to_string(), "day 12 must have 2-4 tasks (has 5)");
        assert_eq!(err.day(), Some(12));
    }
}
