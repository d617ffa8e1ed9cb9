//! Plan service layer: persisting generated plans and tracking skill-plan
//! day completion.

use anyhow::{Context, Result, bail};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use skillplan_db::models::PlanRecord;
use skillplan_db::queries::plans::{self as plan_queries, NewPlan};

use super::types::{GenerationRequest, PLAN_DAYS, Plan};
use super::validate::validate_value;
use crate::error::PipelineError;
use crate::progress::SkillProgress;

/// Store a validated plan. `target_streak` only matters for habit plans.
pub async fn save_generated_plan(
    pool: &PgPool,
    request: &GenerationRequest,
    plan: &Plan,
    target_streak: Option<u32>,
) -> Result<PlanRecord> {
    let target_streak = match target_streak {
        Some(0) => {
            return Err(PipelineError::invalid_argument("target streak must be at least 1").into());
        }
        Some(t) => Some(i32::try_from(t).context("target streak is too large")?),
        None => None,
    };

    let days = plan.to_json().context("failed to serialize plan days")?;
    let record = plan_queries::insert_plan(
        pool,
        &NewPlan {
            kind: request.kind(),
            topic: request.topic(),
            schema_variant: request.variant(),
            difficulty: request.difficulty(),
            days: &days,
            target_streak,
        },
    )
    .await?;

    info!(plan_id = %record.id, topic = %record.topic, kind = %record.kind, "plan saved");
    Ok(record)
}

/// Load a stored plan and re-validate its days.
pub async fn load_plan(pool: &PgPool, id: Uuid) -> Result<(PlanRecord, Plan)> {
    let Some(record) = plan_queries::get_plan(pool, id).await? else {
        bail!("plan {id} not found");
    };
    let plan = validate_value(record.days.clone(), record.schema_variant)
        .with_context(|| format!("stored plan {id} is not a valid plan"))?;
    Ok((record, plan))
}

/// Mark `day` of a plan complete. Completing a day twice is a no-op.
pub async fn complete_day(pool: &PgPool, id: Uuid, day: u32) -> Result<SkillProgress> {
    if !(1..=PLAN_DAYS as u32).contains(&day) {
        return Err(PipelineError::invalid_argument(format!(
            "day must be between 1 and {PLAN_DAYS} (got {day})"
        ))
        .into());
    }

    let Some(record) = plan_queries::mark_day_complete(pool, id, day as i32).await? else {
        bail!("plan {id} not found");
    };

    let progress = SkillProgress::after_marking(&record.completed_days, day);
    info!(
        plan_id = %id,
        day,
        completed = progress.completed_days.len(),
        "day marked complete"
    );
    Ok(progress)
}

/// Delete a plan and everything recorded against it.
pub async fn delete_plan(pool: &PgPool, id: Uuid) -> Result<()> {
    if !plan_queries::delete_plan(pool, id).await? {
        bail!("plan {id} not found");
    }
    info!(plan_id = %id, "plan deleted");
    Ok(())
}
