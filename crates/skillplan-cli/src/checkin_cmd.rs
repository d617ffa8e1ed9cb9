//! `skillplan checkin` and `skillplan stats`.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use sqlx::PgPool;

use skillplan_core::progress::{CheckinInput, record_checkin, refresh_progress};

use crate::plan_cmds::{parse_id, render_habit_summary};

#[derive(Debug, Clone, Default)]
pub struct CheckinOptions {
    pub date: Option<NaiveDate>,
    pub quality: Option<i32>,
    pub notes: Option<String>,
    pub duration: Option<i32>,
    pub skipped: bool,
}

impl CheckinOptions {
    pub fn to_input(&self, today: NaiveDate) -> CheckinInput {
        CheckinInput {
            date: self.date.unwrap_or(today),
            completed: !self.skipped,
            quality_rating: self.quality,
            notes: self.notes.clone(),
            duration_minutes: self.duration,
        }
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub async fn run_checkin(pool: &PgPool, raw_id: &str, options: &CheckinOptions) -> Result<()> {
    let id = parse_id(raw_id)?;
    let today = today();
    let input = options.to_input(today);

    let outcome = record_checkin(pool, id, &input, today).await?;

    let verb = if input.completed { "completed" } else { "skipped" };
    println!("Check-in recorded for {} ({verb}).", input.date);
    print!("{}", render_habit_summary(&outcome.summary));
    Ok(())
}

pub async fn run_stats(pool: &PgPool, raw_id: &str, as_of: Option<NaiveDate>, json: bool) -> Result<()> {
    let id = parse_id(raw_id)?;
    let (summary, _) = refresh_progress(pool, id, as_of.unwrap_or_else(today)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Progress for {id}");
        print!("{}", render_habit_summary(&summary));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_completed_today() {
        let today: NaiveDate = "2024-06-01".parse().unwrap();
        let input = CheckinOptions::default().to_input(today);
        assert_eq!(input, CheckinInput::completed_on(today));
    }

    #[test]
    fn skipped_flag_records_a_miss() {
        let today: NaiveDate = "2024-06-01".parse().unwrap();
        let options = CheckinOptions {
            date: Some("2024-05-30".parse().unwrap()),
            quality: Some(2),
            notes: Some("sick".into()),
            skipped: true,
            ..CheckinOptions::default()
        };
        let input = options.to_input(today);
        assert!(!input.completed);
        assert_eq!(input.date.to_string(), "2024-05-30");
        assert_eq!(input.quality_rating, Some(2));
        assert!(input.validate(today).is_ok());
    }
}
