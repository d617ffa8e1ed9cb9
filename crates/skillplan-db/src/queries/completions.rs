//! Database query functions for the `completion_events` table.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::CompletionEvent;

/// Parameters for recording a completion event.
#[derive(Debug, Clone)]
pub struct NewCompletion<'a> {
    pub item_id: Uuid,
    pub occurred_on: NaiveDate,
    pub completed: bool,
    pub quality_rating: Option<i32>,
    pub notes: Option<&'a str>,
    pub duration_minutes: Option<i32>,
}

/// Insert or overwrite the event for `(item_id, occurred_on)`.
///
/// Takes a connection so callers can run it inside the transaction that
/// also refreshes the item's statistics.
pub async fn upsert_completion(
    conn: &mut PgConnection,
    new: &NewCompletion<'_>,
) -> Result<CompletionEvent> {
    let event = sqlx::query_as::<_, CompletionEvent>(
        "INSERT INTO completion_events \
             (item_id, occurred_on, completed, quality_rating, notes, duration_minutes) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (item_id, occurred_on) DO UPDATE SET \
             completed = EXCLUDED.completed, \
             quality_rating = EXCLUDED.quality_rating, \
             notes = EXCLUDED.notes, \
             duration_minutes = EXCLUDED.duration_minutes, \
             recorded_at = now() \
         RETURNING *",
    )
    .bind(new.item_id)
    .bind(new.occurred_on)
    .bind(new.completed)
    .bind(new.quality_rating)
    .bind(new.notes)
    .bind(new.duration_minutes)
    .fetch_one(&mut *conn)
    .await
    .with_context(|| {
        format!(
            "failed to record completion for item {} on {}",
            new.item_id, new.occurred_on
        )
    })?;

    Ok(event)
}

/// Every date on which the item was marked complete, oldest first.
pub async fn list_completed_dates(conn: &mut PgConnection, item_id: Uuid) -> Result<Vec<NaiveDate>> {
    let dates: Vec<NaiveDate> = sqlx::query_scalar(
        "SELECT occurred_on FROM completion_events \
         WHERE item_id = $1 AND completed \
         ORDER BY occurred_on",
    )
    .bind(item_id)
    .fetch_all(&mut *conn)
    .await
    .with_context(|| format!("failed to list completed dates for item {item_id}"))?;

    Ok(dates)
}

/// All events for an item, newest first.
pub async fn list_events(pool: &PgPool, item_id: Uuid) -> Result<Vec<CompletionEvent>> {
    let events = sqlx::query_as::<_, CompletionEvent>(
        "SELECT * FROM completion_events WHERE item_id = $1 ORDER BY occurred_on DESC",
    )
    .bind(item_id)
    .fetch_all(pool)
    .await
    .with_context(|| format!("failed to list events for item {item_id}"))?;

    Ok(events)
}
