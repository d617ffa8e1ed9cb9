//! Database query functions for the `progress_stats` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::StoredProgress;

/// Freshly computed statistics to store for an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub item_id: Uuid,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub total_completions: i32,
    pub last_completion: Option<NaiveDate>,
    pub success_rate_30d: f64,
    pub as_of: NaiveDate,
}

/// Replace the stored statistics for an item.
pub async fn upsert_progress(
    conn: &mut PgConnection,
    update: &ProgressUpdate,
) -> Result<StoredProgress> {
    let stored = sqlx::query_as::<_, StoredProgress>(
        "INSERT INTO progress_stats \
             (item_id, current_streak, longest_streak, total_completions, \
              last_completion, success_rate_30d, as_of) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (item_id) DO UPDATE SET \
             current_streak = EXCLUDED.current_streak, \
             longest_streak = EXCLUDED.longest_streak, \
             total_completions = EXCLUDED.total_completions, \
             last_completion = EXCLUDED.last_completion, \
             success_rate_30d = EXCLUDED.success_rate_30d, \
             as_of = EXCLUDED.as_of, \
             updated_at = now() \
         RETURNING *",
    )
    .bind(update.item_id)
    .bind(update.current_streak)
    .bind(update.longest_streak)
    .bind(update.total_completions)
    .bind(update.last_completion)
    .bind(update.success_rate_30d)
    .bind(update.as_of)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| format!("failed to store progress for item {}", update.item_id))?;

    Ok(stored)
}

/// Fetch the stored statistics for an item, if any check-in has happened.
pub async fn get_progress(pool: &PgPool, item_id: Uuid) -> Result<Option<StoredProgress>> {
    let stored = sqlx::query_as::<_, StoredProgress>(
        "SELECT * FROM progress_stats WHERE item_id = $1",
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await
    .context("failed to fetch progress")?;

    Ok(stored)
}
