//! Generation loop: retry content generation until the validators accept it.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::result::GenerationReport;
use super::traits::{ContentGenerator, Validator};
use super::validation::validate;
use crate::Result;

/// Default number of validated attempts before giving up on the validators.
pub const MAX_GENERATION_ATTEMPTS: u32 = 10;

/// An accepted artifact and how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub artifact: PathBuf,
    pub report: GenerationReport,
}

/// Generate an artifact that passes `validators`.
///
/// Rejected candidates are deleted from disk before the next attempt. After
/// `max_attempts` rejections one more artifact is generated and accepted
/// without validation, so a run never blocks on validators; the returned
/// report carries `validated: false` in that case.
///
/// Generator errors and failures to delete a rejected candidate propagate.
pub async fn generate_validated(
    generator: &dyn ContentGenerator,
    validators: &[Arc<dyn Validator>],
    input: &str,
    output: &str,
    max_attempts: u32,
) -> Result<Generated> {
    for attempt in 1..=max_attempts {
        let candidate = generator.generate(input, output).await?;
        debug!(
            generator = %generator.name(),
            attempt,
            candidate = %candidate.display(),
            "Generated candidate"
        );

        if validate(&candidate, validators).await {
            return Ok(Generated {
                artifact: candidate,
                report: GenerationReport {
                    attempts: attempt,
                    validated: true,
                },
            });
        }

        info!(
            attempt,
            max_attempts,
            candidate = %candidate.display(),
            "Candidate rejected, deleting"
        );
        tokio::fs::remove_file(&candidate).await?;
    }

    warn!(
        max_attempts,
        output = %output,
        "Giving up on the validators, accepting an unvalidated artifact"
    );
    let artifact = generator.generate(input, output).await?;

    Ok(Generated {
        artifact,
        report: GenerationReport {
            attempts: max_attempts + 1,
            validated: false,
        },
    })
}
