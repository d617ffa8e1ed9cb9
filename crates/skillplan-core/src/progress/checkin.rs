//! Check-in input and its validation.

use std::ops::RangeInclusive;

use chrono::NaiveDate;
use uuid::Uuid;

use skillplan_db::queries::completions::NewCompletion;

use crate::error::PipelineError;

pub const QUALITY_RANGE: RangeInclusive<i32> = 1..=5;
pub const MAX_NOTES_CHARS: usize = 500;

/// One day's check-in for a trackable item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinInput {
    pub date: NaiveDate,
    pub completed: bool,
    pub quality_rating: Option<i32>,
    pub notes: Option<String>,
    pub duration_minutes: Option<i32>,
}

impl CheckinInput {
    /// A completed check-in with no annotations.
    pub fn completed_on(date: NaiveDate) -> Self {
        Self {
            date,
            completed: true,
            quality_rating: None,
            notes: None,
            duration_minutes: None,
        }
    }

    /// Reject out-of-range annotations and dates after `as_of`.
    pub fn validate(&self, as_of: NaiveDate) -> Result<(), PipelineError> {
        if self.date > as_of {
            return Err(PipelineError::invalid_argument(format!(
                "check-in date {} is after {as_of}",
                self.date
            )));
        }
        if let Some(q) = self.quality_rating {
            if !QUALITY_RANGE.contains(&q) {
                return Err(PipelineError::invalid_argument(format!(
                    "quality rating must be between {} and {} (got {q})",
                    QUALITY_RANGE.start(),
                    QUALITY_RANGE.end()
                )));
            }
        }
        if let Some(notes) = &self.notes {
            let len = notes.chars().count();
            if len > MAX_NOTES_CHARS {
                return Err(PipelineError::invalid_argument(format!(
                    "notes must be at most {MAX_NOTES_CHARS} characters (got {len})"
                )));
            }
        }
        if let Some(minutes) = self.duration_minutes {
            if minutes < 1 {
                return Err(PipelineError::invalid_argument(format!(
                    "duration must be at least 1 minute (got {minutes})"
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn to_new_completion(&self, item_id: Uuid) -> NewCompletion<'_> {
        NewCompletion {
            item_id,
            occurred_on: self.date,
            completed: self.completed,
            quality_rating: self.quality_rating,
            notes: self.notes.as_deref(),
            duration_minutes: self.duration_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    fn today() -> NaiveDate {
        "2024-04-10".parse().unwrap()
    }

    fn assert_invalid(input: &CheckinInput, needle: &str) {
        let err = input.validate(today()).unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidArgument);
        assert!(err.to_string().contains(needle), "unexpected message: {err}");
    }

    #[test]
    fn plain_checkin_is_valid() {
        assert!(CheckinInput::completed_on(today()).validate(today()).is_ok());
    }

    #[test]
    fn full_annotations_are_valid() {
        let input = CheckinInput {
            quality_rating: Some(5),
            notes: Some("n".repeat(MAX_NOTES_CHARS)),
            duration_minutes: Some(1),
            ..CheckinInput::completed_on(today())
        };
        assert!(input.validate(today()).is_ok());
    }

    #[test]
    fn rejects_future_date() {
        let input = CheckinInput::completed_on("2024-04-11".parse().unwrap());
        assert_invalid(&input, "after");
    }

    #[test]
    fn rejects_quality_out_of_range() {
        for q in [0, 6] {
            let input = CheckinInput {
                quality_rating: Some(q),
                ..CheckinInput::completed_on(today())
            };
            assert_invalid(&input, "quality rating");
        }
    }

    #[test]
    fn rejects_long_notes() {
        let input = CheckinInput {
            notes: Some("x".repeat(MAX_NOTES_CHARS + 1)),
            ..CheckinInput::completed_on(today())
        };
        assert_invalid(&input, "notes");
    }

    #[test]
    fn rejects_zero_duration() {
        let input = CheckinInput {
            duration_minutes: Some(0),
            ..CheckinInput::completed_on(today())
        };
        assert_invalid(&input, "duration");
    }

    #[test]
    fn new_completion_borrows_notes() {
        let id = Uuid::new_v4();
        let input = CheckinInput {
            notes: Some("felt good".into()),
            completed: false,
            ..CheckinInput::completed_on(today())
        };
        let row = input.to_new_completion(id);
        assert_eq!(row.item_id, id);
        assert_eq!(row.notes, Some("felt good"));
        assert!(!row.completed);
    }
}
