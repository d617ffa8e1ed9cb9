//! Database query functions for the `plans` table.

use anyhow::{Context, Result};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::{Difficulty, PlanKind, PlanRecord, SchemaVariant};

/// Parameters for inserting a new plan row.
#[derive(Debug, Clone)]
pub struct NewPlan<'a> {
    pub kind: PlanKind,
    pub topic: &'a str,
    pub schema_variant: SchemaVariant,
    pub difficulty: Option<Difficulty>,
    pub days: &'a serde_json::Value,
    pub target_streak: Option<i32>,
}

/// Insert a new plan. Returns the row with server-generated defaults
/// (id, timestamps, empty `completed_days`).
pub async fn insert_plan(pool: &PgPool, new: &NewPlan<'_>) -> Result<PlanRecord> {
    let plan = sqlx::query_as::<_, PlanRecord>(
        "INSERT INTO plans (kind, topic, schema_variant, difficulty, days, target_streak) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(new.kind)
    .bind(new.topic)
    .bind(new.schema_variant)
    .bind(new.difficulty)
    .bind(new.days)
    .bind(new.target_streak)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert plan for topic {:?}", new.topic))?;

    Ok(plan)
}

/// Fetch a plan by its ID.
pub async fn get_plan(pool: &PgPool, id: Uuid) -> Result<Option<PlanRecord>> {
    let plan = sqlx::query_as::<_, PlanRecord>("SELECT * FROM plans WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch plan")?;

    Ok(plan)
}

/// Fetch a plan and hold a row lock on it until the surrounding
/// transaction ends. Serializes concurrent check-ins for one item.
pub async fn lock_plan(conn: &mut PgConnection, id: Uuid) -> Result<Option<PlanRecord>> {
    let plan = sqlx::query_as::<_, PlanRecord>("SELECT * FROM plans WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .with_context(|| format!("failed to lock plan {id}"))?;

    Ok(plan)
}

/// List all plans, newest first.
pub async fn list_plans(pool: &PgPool) -> Result<Vec<PlanRecord>> {
    let plans = sqlx::query_as::<_, PlanRecord>("SELECT * FROM plans ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
        .context("failed to list plans")?;

    Ok(plans)
}

/// Delete a plan along with its completion events and statistics.
///
/// Returns `false` if no plan had that ID.
pub async fn delete_plan(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM plans WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .context("failed to delete plan")?;

    Ok(result.rows_affected() > 0)
}

/// Add `day` to the plan's completed days. Completing a day twice is a no-op.
///
/// Returns the updated plan, or `None` if the plan does not exist.
pub async fn mark_day_complete(pool: &PgPool, id: Uuid, day: i32) -> Result<Option<PlanRecord>> {
    let plan = sqlx::query_as::<_, PlanRecord>(
        "UPDATE plans \
         SET completed_days = CASE \
                 WHEN $2 = ANY(completed_days) THEN completed_days \
                 ELSE array_append(completed_days, $2) \
             END, \
             updated_at = now() \
         WHERE id = $1 \
         RETURNING *",
    )
    .bind(id)
    .bind(day)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to mark day {day} complete on plan {id}"))?;

    Ok(plan)
}
