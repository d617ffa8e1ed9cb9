//! CLI handlers for `skillplan plan` subcommands.
//!
//! Implements:
//! - `skillplan plan show [plan-id]`            -- show one plan or list all
//! - `skillplan plan delete <plan-id>`          -- delete a plan and its history
//! - `skillplan plan complete-day <plan-id> <n>` -- mark a skill-plan day done

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use skillplan_core::plan::{PLAN_DAYS, Plan, PlanKind, complete_day, delete_plan, load_plan};
use skillplan_core::progress::{HabitSummary, SkillProgress};
use skillplan_db::queries::{plans as plan_queries, progress as progress_queries};

use crate::PlanCommands;

// -----------------------------------------------------------------------
// Public entry point
// -----------------------------------------------------------------------

pub async fn run_plan_command(command: PlanCommands, pool: &PgPool) -> Result<()> {
    match command {
        PlanCommands::Show { plan_id } => match plan_id {
            Some(id) => cmd_show_one(pool, &id).await,
            None => cmd_show_all(pool).await,
        },
        PlanCommands::Delete { plan_id } => cmd_delete(pool, &plan_id).await,
        PlanCommands::CompleteDay { plan_id, day } => cmd_complete_day(pool, &plan_id, day).await,
    }
}

pub fn parse_id(raw: &str) -> Result<Uuid> {
    raw.parse()
        .with_context(|| format!("invalid plan ID: {raw:?}"))
}

// -----------------------------------------------------------------------
// Rendering
// -----------------------------------------------------------------------

/// Render every day of a plan, ordered by day number.
pub fn render_plan(plan: &Plan) -> String {
    let mut out = String::new();
    for day in plan.ordered_days() {
        match &day.title {
            Some(title) => out.push_str(&format!("Day {}: {title}\n", day.day)),
            None => out.push_str(&format!("Day {}\n", day.day)),
        }
        for task in &day.tasks {
            out.push_str(&format!("  - {}\n", task.description));
            for resource in &task.resources {
                out.push_str(&format!("      {resource}\n"));
            }
        }
        if !day.resources.is_empty() {
            out.push_str("  Resources:\n");
            for resource in &day.resources {
                out.push_str(&format!("    {resource}\n"));
            }
        }
    }
    out
}

pub fn render_skill_progress(progress: &SkillProgress) -> String {
    format!(
        "  Completed:    {}/{PLAN_DAYS} days ({:.1}%)\n  Current day:  {}{}\n",
        progress.completed_days.len(),
        progress.completion_percentage,
        progress.current_day,
        if progress.completed { " (plan complete)" } else { "" },
    )
}

pub fn render_habit_summary(summary: &HabitSummary) -> String {
    let mut out = format!(
        "  As of:          {}\n  Current streak: {}\n  Longest streak: {}\n  Completions:    {}\n  30-day rate:    {:.1}%\n",
        summary.as_of,
        summary.stats.current_streak,
        summary.stats.longest_streak,
        summary.stats.total_completions,
        summary.success_rate_30d,
    );
    if let Some(last) = summary.last_completion {
        out.push_str(&format!("  Last completed: {last}\n"));
    }
    out.push_str("  Milestones:\n");
    for m in &summary.milestones {
        let mark = if m.achieved { "x" } else { " " };
        out.push_str(&format!("    [{mark}] {:>3} days  {}\n", m.days, m.label));
    }
    out
}

// -----------------------------------------------------------------------
// skillplan plan show
// -----------------------------------------------------------------------

async fn cmd_show_all(pool: &PgPool) -> Result<()> {
    let plans = plan_queries::list_plans(pool).await?;

    if plans.is_empty() {
        println!("No plans found. Use `skillplan generate <topic>` to create one.");
        return Ok(());
    }

    let id_w = 36;
    let topic_w = plans.iter().map(|p| p.topic.len()).max().unwrap_or(5).clamp(5, 40);

    println!(
        "{:<id_w$}  {:<5}  {:<topic_w$}  {:>4}  CREATED",
        "ID", "KIND", "TOPIC", "DONE",
    );
    for plan in &plans {
        let topic: String = plan.topic.chars().take(topic_w).collect();
        println!(
            "{:<id_w$}  {:<5}  {:<topic_w$}  {:>4}  {}",
            plan.id,
            plan.kind,
            topic,
            plan.completed_days.len(),
            plan.created_at.format("%Y-%m-%d %H:%M"),
        );
    }

    Ok(())
}

async fn cmd_show_one(pool: &PgPool, raw_id: &str) -> Result<()> {
    let id = parse_id(raw_id)?;
    let (record, plan) = load_plan(pool, id).await?;

    println!("Plan: {}", record.topic);
    println!("  ID:           {}", record.id);
    println!("  Kind:         {}", record.kind);
    println!("  Schema:       {}", record.schema_variant);
    if let Some(difficulty) = record.difficulty {
        println!("  Level:        {difficulty}");
    }
    println!(
        "  Created:      {}",
        record.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(target) = record.target_streak {
        println!("  Target:       {target} day streak");
    }

    match record.kind {
        PlanKind::Skill => {
            print!("{}", render_skill_progress(&SkillProgress::from_completed(&record.completed_days)));
        }
        PlanKind::Habit => {
            if let Some(stored) = progress_queries::get_progress(pool, id).await? {
                println!("  Streak:       {} current, {} longest", stored.current_streak, stored.longest_streak);
                println!("  Completions:  {} (as of {})", stored.total_completions, stored.as_of);
            }
        }
    }

    println!();
    print!("{}", render_plan(&plan));
    Ok(())
}

// -----------------------------------------------------------------------
// skillplan plan delete / complete-day
// -----------------------------------------------------------------------

async fn cmd_delete(pool: &PgPool, raw_id: &str) -> Result<()> {
    let id = parse_id(raw_id)?;
    delete_plan(pool, id).await?;
    println!("Plan {id} deleted.");
    Ok(())
}

async fn cmd_complete_day(pool: &PgPool, raw_id: &str, day: u32) -> Result<()> {
    let id = parse_id(raw_id)?;
    let progress = complete_day(pool, id, day).await?;
    println!("Day {day} marked complete.");
    print!("{}", render_skill_progress(&progress));
    Ok(())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
