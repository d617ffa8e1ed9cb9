//! `skillplan generate`: ask the provider for a plan, validate it, store it.

use anyhow::{Context, Result};
use tracing::warn;

use skillplan_core::PipelineError;
use skillplan_core::plan::{
    Difficulty, GenerationRequest, PlanGenerator, PlanKind, SchemaVariant, save_generated_plan,
};
use skillplan_core::provider::OpenRouterProvider;
use skillplan_db::pool;

use crate::config::SkillplanConfig;
use crate::plan_cmds::render_plan;

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub topic: String,
    pub kind: PlanKind,
    pub variant: SchemaVariant,
    pub difficulty: Option<Difficulty>,
    pub target_streak: Option<u32>,
    pub dry_run: bool,
    pub json: bool,
}

impl GenerateOptions {
    /// Build the generation request, rejecting a blank or out-of-bounds topic.
    pub fn to_request(&self) -> Result<GenerationRequest, PipelineError> {
        let request = GenerationRequest::new(&self.topic, self.kind)?.with_variant(self.variant);
        Ok(match self.difficulty {
            Some(difficulty) => request.with_difficulty(difficulty),
            None => request,
        })
    }
}

pub async fn run_generate(
    request: &GenerationRequest,
    options: &GenerateOptions,
    config: &SkillplanConfig,
) -> Result<()> {
    let provider = OpenRouterProvider::new(config.provider.to_provider_config()?)?;
    let generator = PlanGenerator::new(provider);

    let plan = match generator.generate_request(request).await {
        Ok(plan) => plan,
        Err(e) => {
            if e.is_retryable() {
                warn!("generation failed; running the command again may succeed");
            }
            return Err(e).context("plan generation failed");
        }
    };

    if options.dry_run {
        if options.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print!("{}", render_plan(&plan));
        }
        return Ok(());
    }

    let db_pool = pool::create_pool(&config.db_config).await?;
    let result = save_generated_plan(&db_pool, request, &plan, options.target_streak).await;
    db_pool.close().await;
    let record = result?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!("Plan created.");
    println!();
    println!("  Plan ID:  {}", record.id);
    println!("  Topic:    {}", record.topic);
    println!("  Kind:     {}", record.kind);
    println!("  Schema:   {}", record.schema_variant);
    if let Some(difficulty) = record.difficulty {
        println!("  Level:    {difficulty}");
    }
    println!("  Days:     {}", plan.len());
    println!();
    println!("Next: `skillplan plan show {}`", record.id);
    Ok(())
}
