//! Single-run orchestrator: source, generate/validate, filter, publish.

use tracing::{info, warn};

use super::config::RunConfig;
use super::generation::generate_validated;
use super::result::RunResult;
use super::traits::{FilterContext, PublishOptions};
use crate::{Error, Result};

/// Run one pipeline configuration to completion.
///
/// Filters and destinations run one at a time in configured order: filters
/// rewrite the artifact in place and later steps see their changes. Errors
/// from the source, generator, filters and destinations are returned as-is.
pub async fn generate(config: &RunConfig) -> Result<RunResult> {
    let mut result = RunResult::default();

    let artifact = match &config.image {
        Some(image) => {
            info!(image = %image.display(), "Using supplied image");
            image.clone()
        }
        None => {
            let (source, content) = match (&config.source, &config.content) {
                (Some(source), Some(content)) => (source, content),
                _ => {
                    return Err(Error::config(
                        "a run needs either an image or both a source and a content generator",
                    ));
                }
            };

            let picked = source.get().await?;
            info!(source = %source.name(), output = %picked.output, "Picked source");

            let generated = generate_validated(
                content.as_ref(),
                &config.validators,
                &picked.input,
                &picked.output,
                config.max_attempts,
            )
            .await?;

            result.tags.push(picked.output.clone());
            result.source = Some(picked);
            result.generation = Some(generated.report);
            generated.artifact
        }
    };

    result.content = Some(artifact.clone());

    for filter in &config.filters {
        info!(filter = %filter.name(), "Applying filter");
        let output = filter.apply(&artifact, FilterContext::new(&result)).await?;
        if let Some(output) = output {
            result.filters.insert(filter.name().to_string(), output);
        }
    }

    let options = PublishOptions {
        tags: result.tags.clone(),
        text: config.post_text.as_ref().and_then(|f| f(&result)),
    };

    for destination in &config.destinations {
        info!(destination = %destination.name(), "Publishing");
        match destination.publish(&artifact, &options).await? {
            Some(response) => {
                info!(
                    destination = %destination.name(),
                    "Go check it out at {}",
                    response.describe()
                );
                result
                    .destinations
                    .insert(destination.name().to_string(), response);
            }
            None => {
                warn!(destination = %destination.name(), "Destination returned no response");
            }
        }
    }

    Ok(result)
}
