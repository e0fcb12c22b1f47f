use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use stills::content::{StillConfig, StillGenerator};
use stills::pipeline::{RunConfig, RunResult, delete_stills, generate};
use tracing::info;

use crate::cli::RunArgs;
use crate::config::AppConfig;

/// Text posted with a still: the captions burnt into it, if any.
fn caption_text(result: &RunResult) -> Option<String> {
    let captions = result.filters.get("captions")?.as_array()?;
    let text = captions
        .iter()
        .filter_map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    (!text.is_empty()).then_some(text)
}

fn run_config(config: &AppConfig, image: Option<PathBuf>) -> Result<RunConfig> {
    let base = match image {
        Some(image) => RunConfig::for_image(image),
        None => {
            let source = config
                .source()
                .build()
                .context("Invalid source configuration")?;
            let generator = StillGenerator::new(StillConfig::new(&config.paths.stills));
            RunConfig::generated(source, Arc::new(generator))
        }
    };

    let run = config
        .pipeline()
        .apply_to(base)
        .context("Invalid pipeline configuration")?;
    Ok(run.with_post_text(caption_text))
}

/// Run the pipeline once.
///
/// A generated still is deleted afterwards unless `keep` is set. A supplied
/// image is never deleted.
pub async fn execute(config: &AppConfig, args: RunArgs) -> Result<RunResult> {
    let run = run_config(config, args.image)?;
    let result = generate(&run).await.context("Pipeline run failed")?;

    if result.generation.is_some() && !args.keep {
        let deleted = delete_stills([&result]).await?;
        info!(deleted = deleted.len(), "Cleaned up");
    }

    Ok(result)
}
