//! Plan data model: the generation request and the validated 30-day plan.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

pub use skillplan_db::models::{Difficulty, PlanKind, SchemaVariant};

use crate::error::PipelineError;

/// Number of days in every plan.
pub const PLAN_DAYS: usize = 30;

/// Allowed number of tasks on a day.
pub const TASKS_PER_DAY: RangeInclusive<usize> = 2..=4;

/// Allowed number of resources on a day (or on a task, for
/// [`SchemaVariant::NestedResources`]).
pub const RESOURCES_PER_DAY: RangeInclusive<usize> = 1..=2;

/// Allowed topic length in characters, after trimming.
pub const TOPIC_CHARS: RangeInclusive<usize> = 3..=100;

/// Input to a single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    topic: String,
    kind: PlanKind,
    variant: SchemaVariant,
    difficulty: Option<Difficulty>,
}

impl GenerationRequest {
    /// Build a request for the canonical flat schema.
    ///
    /// The topic is trimmed. An empty topic, or one outside
    /// [`TOPIC_CHARS`], is rejected.
    pub fn new(topic: &str, kind: PlanKind) -> Result<Self, PipelineError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(PipelineError::invalid_argument("topic must not be empty"));
        }
        let chars = topic.chars().count();
        if !TOPIC_CHARS.contains(&chars) {
            return Err(PipelineError::invalid_argument(format!(
                "topic must be between {} and {} characters (got {chars})",
                TOPIC_CHARS.start(),
                TOPIC_CHARS.end()
            )));
        }
        Ok(Self {
            topic: topic.to_string(),
            kind,
            variant: SchemaVariant::default(),
            difficulty: None,
        })
    }

    pub fn with_variant(mut self, variant: SchemaVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn kind(&self) -> PlanKind {
        self.kind
    }

    pub fn variant(&self) -> SchemaVariant {
        self.variant
    }

    /// The level explicitly requested, if any.
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }
}

/// A single task. Bare-string tasks from the provider are normalized to a
/// `TaskItem` with no resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

impl TaskItem {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            resources: Vec::new(),
        }
    }
}

/// One validated day of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub tasks: Vec<TaskItem>,
    /// Empty only for [`SchemaVariant::NestedResources`] days that carry
    /// their resources on the tasks.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

impl DayPlan {
    /// Resources for the day, falling back to the union of task resources.
    pub fn all_resources(&self) -> Vec<&str> {
        if !self.resources.is_empty() {
            return self.resources.iter().map(String::as_str).collect();
        }
        self.tasks
            .iter()
            .flat_map(|t| t.resources.iter().map(String::as_str))
            .collect()
    }
}

/// A validated plan: exactly [`PLAN_DAYS`] days with unique day numbers
/// covering `1..=30`.
///
/// Only the validator constructs a `Plan`. Days keep the order the provider
/// returned them in; look days up by number with [`Plan::day`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Plan {
    days: Vec<DayPlan>,
}

impl Plan {
    pub(crate) fn from_validated(days: Vec<DayPlan>) -> Self {
        debug_assert_eq!(days.len(), PLAN_DAYS);
        Self { days }
    }

    pub fn days(&self) -> &[DayPlan] {
        &self.days
    }

    pub fn day(&self, number: u32) -> Option<&DayPlan> {
        self.days.iter().find(|d| d.day == number)
    }

    /// Days sorted by day number.
    pub fn ordered_days(&self) -> Vec<&DayPlan> {
        let mut days: Vec<&DayPlan> = self.days.iter().collect();
        days.sort_by_key(|d| d.day);
        days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn into_days(self) -> Vec<DayPlan> {
        self.days
    }

    /// The plan as a JSON array in canonical form, ready for storage.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(&self.days)
    }
}
