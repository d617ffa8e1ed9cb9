//! Check-in recording and statistics refresh against the database.
//!
//! Every write happens inside one transaction that first locks the item's
//! plan row, so concurrent check-ins for the same item are applied one after
//! the other and each recompute sees the full history.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use skillplan_db::models::{CompletionEvent, PlanRecord, StoredProgress};
use skillplan_db::queries::{completions, plans, progress};

use super::checkin::CheckinInput;
use super::stats::completed_dates;
use super::summary::HabitSummary;

/// Result of recording one check-in.
#[derive(Debug, Clone, Serialize)]
pub struct CheckinOutcome {
    pub event: CompletionEvent,
    pub summary: HabitSummary,
    pub stored: StoredProgress,
}

fn target_streak(plan: &PlanRecord) -> Option<u32> {
    plan.target_streak.and_then(|t| u32::try_from(t).ok())
}

/// Record (or overwrite) the check-in for `input.date` and refresh the
/// item's statistics as of `as_of`.
pub async fn record_checkin(
    pool: &PgPool,
    item_id: Uuid,
    input: &CheckinInput,
    as_of: NaiveDate,
) -> Result<CheckinOutcome> {
    input.validate(as_of)?;

    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let Some(plan) = plans::lock_plan(&mut *tx, item_id).await? else {
        bail!("plan {item_id} not found");
    };

    let event = completions::upsert_completion(&mut *tx, &input.to_new_completion(item_id)).await?;
    let dates = completions::list_completed_dates(&mut *tx, item_id).await?;
    let summary = HabitSummary::compute(dates, as_of, target_streak(&plan));
    let stored = progress::upsert_progress(&mut *tx, &summary.to_update(item_id)).await?;

    tx.commit().await.context("failed to commit check-in")?;

    info!(
        %item_id,
        date = %input.date,
        completed = input.completed,
        current_streak = summary.stats.current_streak,
        longest_streak = summary.stats.longest_streak,
        "check-in recorded"
    );

    Ok(CheckinOutcome {
        event,
        summary,
        stored,
    })
}

/// Compute the summary for an item without writing anything.
pub async fn habit_summary(pool: &PgPool, item_id: Uuid, as_of: NaiveDate) -> Result<HabitSummary> {
    let Some(plan) = plans::get_plan(pool, item_id).await? else {
        bail!("plan {item_id} not found");
    };
    let events = completions::list_events(pool, item_id).await?;
    Ok(HabitSummary::compute(
        completed_dates(&events),
        as_of,
        target_streak(&plan),
    ))
}

/// Recompute and store an item's statistics as of `as_of`.
pub async fn refresh_progress(
    pool: &PgPool,
    item_id: Uuid,
    as_of: NaiveDate,
) -> Result<(HabitSummary, StoredProgress)> {
    let mut tx = pool.begin().await.context("failed to begin transaction")?;

    let Some(plan) = plans::lock_plan(&mut *tx, item_id).await? else {
        bail!("plan {item_id} not found");
    };

    let dates = completions::list_completed_dates(&mut *tx, item_id).await?;
    let summary = HabitSummary::compute(dates, as_of, target_streak(&plan));
    let stored = progress::upsert_progress(&mut *tx, &summary.to_update(item_id)).await?;

    tx.commit().await.context("failed to commit progress refresh")?;

    Ok((summary, stored))
}
