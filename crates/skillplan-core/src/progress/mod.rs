//! Progress aggregation: streak statistics, habit summaries and check-ins.

pub mod checkin;
pub mod service;
pub mod stats;
pub mod summary;

pub use checkin::CheckinInput;
pub use service::{CheckinOutcome, habit_summary, record_checkin, refresh_progress};
pub use stats::{ProgressStats, completed_dates, recompute};
pub use summary::{HabitSummary, Milestone, SkillProgress, milestones, success_rate};
