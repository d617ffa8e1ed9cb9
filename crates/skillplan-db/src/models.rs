use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What a plan is meant to build: a learnable skill or a recurring habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Skill,
    Habit,
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Skill => "skill",
            Self::Habit => "habit",
        };
        f.write_str(s)
    }
}

impl FromStr for PlanKind {
    type Err = PlanKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skill" => Ok(Self::Skill),
            "habit" => Ok(Self::Habit),
            other => Err(PlanKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`PlanKind`] string.
#[derive(Debug, Clone)]
pub struct PlanKindParseError(pub String);

impl fmt::Display for PlanKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid plan kind: {:?} (expected skill or habit)", self.0)
    }
}

impl std::error::Error for PlanKindParseError {}

// ---------------------------------------------------------------------------

/// Shape of a day object in a generated plan.
///
/// `Flat` keeps `tasks` and `resources` side by side on the day.
/// `NestedResources` attaches resources to each task instead.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SchemaVariant {
    #[default]
    Flat,
    NestedResources,
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Flat => "flat",
            Self::NestedResources => "nested_resources",
        };
        f.write_str(s)
    }
}

impl FromStr for SchemaVariant {
    type Err = SchemaVariantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(Self::Flat),
            "nested_resources" | "nested" => Ok(Self::NestedResources),
            other => Err(SchemaVariantParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`SchemaVariant`] string.
#[derive(Debug, Clone)]
pub struct SchemaVariantParseError(pub String);

impl fmt::Display for SchemaVariantParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid schema variant: {:?} (expected flat or nested_resources)",
            self.0
        )
    }
}

impl std::error::Error for SchemaVariantParseError {}

/// Level a skill plan is pitched at.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        };
        f.write_str(s)
    }
}

impl FromStr for Difficulty {
    type Err = DifficultyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(DifficultyParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Difficulty`] string.
#[derive(Debug, Clone)]
pub struct DifficultyParseError(pub String);

impl fmt::Display for DifficultyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid difficulty: {:?} (expected beginner, intermediate or advanced)",
            self.0
        )
    }
}

impl std::error::Error for DifficultyParseError {}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A stored plan. `days` holds the validated day objects as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlanRecord {
    pub id: Uuid,
    pub kind: PlanKind,
    pub topic: String,
    pub schema_variant: SchemaVariant,
    pub difficulty: Option<Difficulty>,
    pub days: serde_json::Value,
    pub completed_days: Vec<i32>,
    pub target_streak: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One completion event per `(item_id, occurred_on)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CompletionEvent {
    pub item_id: Uuid,
    pub occurred_on: NaiveDate,
    pub completed: bool,
    pub quality_rating: Option<i32>,
    pub notes: Option<String>,
    pub duration_minutes: Option<i32>,
    pub recorded_at: DateTime<Utc>,
}

/// Statistics last derived for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StoredProgress {
    pub item_id: Uuid,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_completions: i32,
    pub last_completion: Option<NaiveDate>,
    pub success_rate_30d: f64,
    pub as_of: NaiveDate,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_kind_display_roundtrip() {
        for v in [PlanKind::Skill, PlanKind::Habit] {
            let parsed: PlanKind = v.to_string().parse().expect("should parse");
            assert_eq!(v, parsed);
        }
    }

    #[test]
    fn plan_kind_invalid() {
        let err = "hobby".parse::<PlanKind>().unwrap_err();
        assert!(err.to_string().contains("hobby"));
    }

    #[test]
    fn schema_variant_accepts_short_form() {
        assert_eq!(
            "nested".parse::<SchemaVariant>().unwrap(),
            SchemaVariant::NestedResources
        );
        assert_eq!(SchemaVariant::default(), SchemaVariant::Flat);
    }

    #[test]
    fn schema_variant_invalid() {
        assert!("deep".parse::<SchemaVariant>().is_err());
    }

    #[test]
    fn difficulty_display_roundtrip() {
        for v in [
            Difficulty::Beginner,
            Difficulty::Intermediate,
            Difficulty::Advanced,
        ] {
            let parsed: Difficulty = v.to_string().parse().expect("should parse");
            assert_eq!(v, parsed);
        }
        assert_eq!(Difficulty::default(), Difficulty::Beginner);
    }

    #[test]
    fn difficulty_invalid() {
        let err = "expert".parse::<Difficulty>().unwrap_err();
        assert!(err.to_string().contains("expert"));
        assert!("Beginner".parse::<Difficulty>().is_err());
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&SchemaVariant::NestedResources).unwrap();
        assert_eq!(json, "\"nested_resources\"");
        let json = serde_json::to_string(&PlanKind::Habit).unwrap();
        assert_eq!(json, "\"habit\"");
    }
}
