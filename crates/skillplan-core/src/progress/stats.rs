//! Streak and completion statistics derived from a completion history.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use skillplan_db::models::CompletionEvent;

/// Statistics for one trackable item at a reference date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressStats {
    /// Consecutive completed days ending at the reference date. Zero if the
    /// reference date itself has no completion.
    pub current_streak: u32,
    /// Longest run of consecutive completed days anywhere in the history.
    pub longest_streak: u32,
    /// Number of distinct completed dates.
    pub total_completions: u32,
}

/// Recompute statistics from the full set of completed dates.
///
/// Duplicate dates count once. Pure: the same inputs always give the same
/// result, regardless of input order.
pub fn recompute<I>(events: I, as_of: NaiveDate) -> ProgressStats
where
    I: IntoIterator<Item = NaiveDate>,
{
    let dates: BTreeSet<NaiveDate> = events.into_iter().collect();

    ProgressStats {
        current_streak: current_streak(&dates, as_of),
        longest_streak: longest_streak(&dates),
        total_completions: saturating_u32(dates.len()),
    }
}

/// Distinct dates on which the item was actually completed.
///
/// Events recorded with `completed = false` are skipped.
pub fn completed_dates(events: &[CompletionEvent]) -> BTreeSet<NaiveDate> {
    events
        .iter()
        .filter(|e| e.completed)
        .map(|e| e.occurred_on)
        .collect()
}

fn current_streak(dates: &BTreeSet<NaiveDate>, as_of: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut cursor = Some(as_of);
    while let Some(day) = cursor {
        if !dates.contains(&day) {
            break;
        }
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

fn longest_streak(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut descending = dates.iter().rev();
    let Some(mut previous) = descending.next().copied() else {
        return 0;
    };

    let mut run = 1;
    let mut longest = 1;
    for &date in descending {
        if previous.pred_opt() == Some(date) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
        previous = date;
    }
    longest
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
