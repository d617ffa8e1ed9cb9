//! Derived views over progress: habit summaries, milestones and skill-plan
//! completion.

use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use skillplan_db::queries::progress::ProgressUpdate;

use super::stats::{ProgressStats, recompute};
use crate::plan::types::PLAN_DAYS;

/// Length of the trailing window used for the success rate.
pub const SUCCESS_WINDOW_DAYS: u32 = 30;

/// Streak lengths that earn a milestone, with their labels.
pub const DEFAULT_MILESTONES: [(u32, &str); 5] = [
    (7, "First Week Champion!"),
    (21, "Habit Formation Master!"),
    (30, "Monthly Consistency King!"),
    (66, "Habit Automation Expert!"),
    (100, "Century Club Member!"),
];

pub const PERSONAL_MILESTONE_LABEL: &str = "Personal Goal Achieved!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub days: u32,
    pub label: &'static str,
    pub achieved: bool,
}

/// Milestones for an item, sorted by length. A personal `target_streak` is
/// added unless it coincides with a default milestone.
pub fn milestones(longest_streak: u32, target_streak: Option<u32>) -> Vec<Milestone> {
    let mut list: Vec<Milestone> = DEFAULT_MILESTONES
        .iter()
        .map(|&(days, label)| Milestone {
            days,
            label,
            achieved: longest_streak >= days,
        })
        .collect();

    if let Some(target) = target_streak.filter(|t| *t > 0) {
        if !list.iter().any(|m| m.days == target) {
            list.push(Milestone {
                days: target,
                label: PERSONAL_MILESTONE_LABEL,
                achieved: longest_streak >= target,
            });
            list.sort_by_key(|m| m.days);
        }
    }
    list
}

/// Percentage of the [`SUCCESS_WINDOW_DAYS`] days ending at `as_of` that
/// have a completion.
pub fn success_rate(dates: &BTreeSet<NaiveDate>, as_of: NaiveDate) -> f64 {
    let start = as_of
        .checked_sub_days(Days::new(u64::from(SUCCESS_WINDOW_DAYS - 1)))
        .unwrap_or(NaiveDate::MIN);
    let hits = dates.range(start..=as_of).count();
    hits as f64 * 100.0 / f64::from(SUCCESS_WINDOW_DAYS)
}

/// Everything reported about a habit at a reference date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitSummary {
    pub as_of: NaiveDate,
    #[serde(flatten)]
    pub stats: ProgressStats,
    pub last_completion: Option<NaiveDate>,
    pub success_rate_30d: f64,
    pub milestones: Vec<Milestone>,
}

impl HabitSummary {
    /// Build a summary from the completed dates of one item.
    pub fn compute<I>(dates: I, as_of: NaiveDate, target_streak: Option<u32>) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let dates: BTreeSet<NaiveDate> = dates.into_iter().collect();
        let stats = recompute(dates.iter().copied(), as_of);
        Self {
            as_of,
            stats,
            last_completion: dates.range(..=as_of).next_back().copied(),
            success_rate_30d: success_rate(&dates, as_of),
            milestones: milestones(stats.longest_streak, target_streak),
        }
    }

    /// Row to persist for `item_id`.
    pub fn to_update(&self, item_id: Uuid) -> ProgressUpdate {
        ProgressUpdate {
            item_id,
            current_streak: to_i32(self.stats.current_streak),
            longest_streak: to_i32(self.stats.longest_streak),
            total_completions: to_i32(self.stats.total_completions),
            last_completion: self.last_completion,
            success_rate_30d: self.success_rate_30d,
            as_of: self.as_of,
        }
    }
}

fn to_i32(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Progress through a 30-day skill plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillProgress {
    pub completed_days: Vec<u32>,
    pub completion_percentage: f64,
    /// The day the learner should work on next.
    pub current_day: u32,
    pub completed: bool,
}

impl SkillProgress {
    /// Progress from the stored set of completed days. `current_day` follows
    /// the highest completed day.
    pub fn from_completed(days: &[i32]) -> Self {
        let completed_days = normalize_days(days);
        let next = completed_days.last().map_or(1, |d| d + 1);
        Self::build(completed_days, next)
    }

    /// Progress right after `day` was marked complete. `current_day` follows
    /// the day just marked, even if later days were completed earlier.
    pub fn after_marking(days: &[i32], day: u32) -> Self {
        Self::build(normalize_days(days), day + 1)
    }

    fn build(completed_days: Vec<u32>, next: u32) -> Self {
        let total = PLAN_DAYS as u32;
        let done = completed_days.len() as u32;
        Self {
            completion_percentage: f64::from(done) * 100.0 / f64::from(total),
            current_day: next.clamp(1, total),
            completed: done >= total,
            completed_days,
        }
    }
}

fn normalize_days(days: &[i32]) -> Vec<u32> {
    let set: BTreeSet<u32> = days
        .iter()
        .filter_map(|&d| u32::try_from(d).ok())
        .filter(|d| (1..=PLAN_DAYS as u32).contains(d))
        .collect();
    set.into_iter().collect()
}
