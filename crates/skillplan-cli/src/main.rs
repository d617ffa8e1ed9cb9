mod checkin_cmd;
mod config;
mod generate_cmd;
mod plan_cmds;
#[cfg(test)]
mod test_util;

use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use skillplan_core::plan::{Difficulty, PlanKind, SchemaVariant};
use skillplan_db::pool;

use checkin_cmd::CheckinOptions;
use config::SkillplanConfig;
use generate_cmd::GenerateOptions;

#[derive(Parser)]
#[command(name = "skillplan", about = "Generate and track 30-day skill and habit plans")]
struct Cli {
    /// Database URL (overrides SKILLPLAN_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a skillplan config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/skillplan")]
        db_url: String,
        /// Generation provider API key
        #[arg(long)]
        api_key: Option<String>,
        /// Model to request from the provider
        #[arg(long)]
        model: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the database if needed and run migrations
    DbInit,
    /// Generate a 30-day plan for a topic and store it
    Generate {
        /// What to learn or practice, e.g. "watercolor painting"
        topic: String,
        /// skill or habit
        #[arg(long, default_value = "skill")]
        kind: PlanKind,
        /// Day shape: flat or nested_resources
        #[arg(long, default_value = "flat")]
        variant: SchemaVariant,
        /// Level to pitch the plan at: beginner, intermediate or advanced
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Personal streak goal for a habit plan
        #[arg(long)]
        target_streak: Option<u32>,
        /// Model to request (overrides SKILLPLAN_MODEL env var)
        #[arg(long)]
        model: Option<String>,
        /// Print the validated plan without storing it
        #[arg(long)]
        dry_run: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Record a daily check-in for a plan
    Checkin {
        /// Plan ID
        item_id: String,
        /// Day being checked in (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Quality rating from 1 to 5
        #[arg(long)]
        quality: Option<i32>,
        /// Free-form notes (at most 500 characters)
        #[arg(long)]
        notes: Option<String>,
        /// Minutes spent
        #[arg(long)]
        duration: Option<i32>,
        /// Record the day as missed
        #[arg(long)]
        skipped: bool,
    },
    /// Recompute and show streak statistics for a plan
    Stats {
        /// Plan ID
        item_id: String,
        /// Reference date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show plan details (or list all plans)
    Show {
        /// Plan ID to show (omit to list all)
        plan_id: Option<String>,
    },
    /// Delete a plan with its check-ins and statistics
    Delete {
        /// Plan ID to delete
        plan_id: String,
    },
    /// Mark one day of a plan complete
    CompleteDay {
        /// Plan ID
        plan_id: String,
        /// Day number (1-30)
        day: u32,
    },
}

/// Execute the `skillplan init` command: write config file.
fn cmd_init(
    db_url: &str,
    api_key: Option<String>,
    model: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let has_key = api_key.is_some();
    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        provider: config::ProviderSection {
            api_key,
            model,
            ..config::ProviderSection::default()
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    if has_key {
        println!("  provider.api_key = (set)");
    } else {
        println!("  provider.api_key not set; export {} before generating", config::API_KEY_ENV);
    }
    println!();
    println!("Next: run `skillplan db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `skillplan db-init` command: create database and run migrations.
async fn cmd_db_init(resolved: &SkillplanConfig) -> anyhow::Result<()> {
    println!("Initializing skillplan database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("skillplan db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            api_key,
            model,
            force,
        } => {
            cmd_init(&db_url, api_key, model, force)?;
        }
        Commands::DbInit => {
            let resolved = SkillplanConfig::resolve(cli.database_url.as_deref(), None)?;
            cmd_db_init(&resolved).await?;
        }
        Commands::Generate {
            topic,
            kind,
            variant,
            difficulty,
            target_streak,
            model,
            dry_run,
            json,
        } => {
            let options = GenerateOptions {
                topic,
                kind,
                variant,
                difficulty,
                target_streak,
                dry_run,
                json,
            };
            // A bad topic fails before the config file is read.
            let request = options.to_request()?;
            let resolved = SkillplanConfig::resolve(cli.database_url.as_deref(), model.as_deref())?;
            generate_cmd::run_generate(&request, &options, &resolved).await?;
        }
        Commands::Plan { command } => {
            let resolved = SkillplanConfig::resolve(cli.database_url.as_deref(), None)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::run_plan_command(command, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Checkin {
            item_id,
            date,
            quality,
            notes,
            duration,
            skipped,
        } => {
            let resolved = SkillplanConfig::resolve(cli.database_url.as_deref(), None)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let options = CheckinOptions {
                date,
                quality,
                notes,
                duration,
                skipped,
            };
            let result = checkin_cmd::run_checkin(&db_pool, &item_id, &options).await;
            db_pool.close().await;
            result?;
        }
        Commands::Stats {
            item_id,
            as_of,
            json,
        } => {
            let resolved = SkillplanConfig::resolve(cli.database_url.as_deref(), None)?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = checkin_cmd::run_stats(&db_pool, &item_id, as_of, json).await;
            db_pool.close().await;
            result?;
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "skillplan", &mut std::io::stdout());
        }
    }

    Ok(())
}
