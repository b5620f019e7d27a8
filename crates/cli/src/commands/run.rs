//! `scopehound run` — drive one request file through the engine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use scopehound_agents::{LlmPlanner, LlmValidator};
use scopehound_config::AppConfig;
use scopehound_core::{EngineOutcome, RunInput};
use scopehound_engine::handoff::render_enriched_context;
use scopehound_engine::LoopDriver;
use scopehound_providers::AnthropicProvider;
use scopehound_tools::default_registry;

pub async fn run(
    input_path: PathBuf,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) => AppConfig::load_from(&path)?,
        None => AppConfig::from_env()?,
    };

    let api_key = config.provider.api_key.clone().ok_or(
        "No API key configured. Set SCOPEHOUND_API_KEY or provider.api_key in the config file.",
    )?;

    let raw = std::fs::read_to_string(&input_path)?;
    let input: RunInput = serde_json::from_str(&raw)?;

    let mut provider = AnthropicProvider::new(api_key)?;
    if let Some(base_url) = &config.provider.base_url {
        provider = provider.with_base_url(base_url);
    }
    let provider = Arc::new(provider);

    let planner = Arc::new(LlmPlanner::new(provider.clone(), &config.provider.model));
    let validator = Arc::new(LlmValidator::new(
        provider,
        &config.provider.model,
        config.engine.confidence_thresholds,
    ));

    let registry = default_registry(Duration::from_secs(config.engine.tool_timeout_secs));
    let driver = LoopDriver::new(planner, validator, config.engine.clone());

    let output = driver.run(&input, registry).await;

    match &output.outcome {
        EngineOutcome::Completed(completed) => {
            println!("✓ Request complete after {} iteration(s)", completed.iterations);
            println!("  category: {}", completed.category);
            println!("\nEnriched context for the architect:");
            println!("{}", render_enriched_context(&completed.enriched_context));
        }
        EngineOutcome::Escalated(escalated) => {
            println!(
                "✗ Escalated to human review: {} after {} iteration(s)",
                escalated.stop_reason, escalated.iterations
            );
            if !escalated.missing_questions.is_empty() {
                println!("\nStill missing:");
                for question in &escalated.missing_questions {
                    println!("  - {question}");
                }
            }
            if !escalated.enriched_context.is_empty() {
                println!("\nAlready discovered:");
                println!("{}", render_enriched_context(&escalated.enriched_context));
            }
        }
    }

    println!("\nMetrics:");
    println!("{}", serde_json::to_string_pretty(&output.metrics.to_map())?);

    Ok(())
}
