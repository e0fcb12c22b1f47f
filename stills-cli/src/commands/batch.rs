use std::sync::Arc;

use anyhow::{Context, Result};
use stills::batch::{
    BatchOutcome, BatchPipeline, DupesReducer, ScreeningReducer, StillBatch, StillBatchConfig,
    published_names,
};
use stills::validators::CommandValidator;
use tracing::info;

use crate::cli::BatchArgs;
use crate::config::{AppConfig, ScreeningConfig};

fn batch_config(config: &AppConfig, args: &BatchArgs) -> StillBatchConfig {
    StillBatchConfig {
        pattern: args
            .pattern
            .clone()
            .unwrap_or_else(|| config.batch.pattern.clone()),
        count: args.num.unwrap_or(config.batch.num),
        start_ratio: config.batch.start_ratio,
        end_ratio: config.batch.end_ratio,
        ..StillBatchConfig::new(&config.paths.videos, &config.paths.stills)
    }
}

/// Screening from the command line wins over the config file.
fn screening(config: &AppConfig, args: &BatchArgs) -> Option<ScreeningConfig> {
    match &args.screen_cmd {
        Some(command) => Some(ScreeningConfig {
            command: command.clone(),
            percent: args
                .screen_percent
                .or(config.batch.screening.as_ref().map(|s| s.percent))
                .unwrap_or(50),
        }),
        None => config.batch.screening.clone(),
    }
}

/// Dupes first, then screening, then the configured reducers.
async fn build_pipeline(config: &AppConfig, args: &BatchArgs) -> Result<BatchPipeline> {
    let published = published_names(&config.paths.archive)
        .await
        .with_context(|| format!("Failed to list {}", config.paths.archive.display()))?;
    let mut pipeline = BatchPipeline::new().add_reducer(DupesReducer::new(published));

    if let Some(screening) = screening(config, args) {
        let validator = CommandValidator::new("screen", screening.command);
        pipeline = pipeline.add_reducer(ScreeningReducer::from_percent(
            Arc::new(validator),
            screening.percent,
        ));
    }

    config
        .pipeline()
        .extend_batch(pipeline)
        .await
        .context("Invalid reducer configuration")
}

pub async fn execute(config: &AppConfig, args: BatchArgs) -> Result<BatchOutcome> {
    let pipeline = build_pipeline(config, &args).await?;
    info!(reducers = ?pipeline.reducer_names(), "Batch pipeline ready");

    let batch = StillBatch::new(batch_config(config, &args));
    let outcome = batch.run(&pipeline).await.context("Batch failed")?;

    for stage in &outcome.stages {
        info!(
            reducer = %stage.reducer,
            kept = stage.kept,
            deleted = stage.deleted.len(),
            "Stage summary"
        );
    }
    Ok(outcome)
}
