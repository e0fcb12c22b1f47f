//! Content screening: keep a minimum share of candidates that pass a check.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::reducer::Reducer;
use crate::Result;
use crate::pipeline::Validator;

/// Classifies every candidate with a validator and keeps all passing files.
///
/// Failing files are kept too, in their original order, as long as passing
/// files still make up at least `min_fraction` of the kept set. With a
/// `min_fraction` of 0.5, five passing files allow up to five failing ones.
pub struct ScreeningReducer {
    validator: Arc<dyn Validator>,
    min_fraction: f64,
}

impl ScreeningReducer {
    /// `min_fraction` is clamped to `0.0..=1.0`.
    pub fn new(validator: Arc<dyn Validator>, min_fraction: f64) -> Self {
        Self {
            validator,
            min_fraction: min_fraction.clamp(0.0, 1.0),
        }
    }

    /// Build from a percentage as given on the command line (0-100).
    pub fn from_percent(validator: Arc<dyn Validator>, percent: u8) -> Self {
        Self::new(validator, f64::from(percent) / 100.0)
    }

    /// Maximum failing files that can join `passing` passing files.
    fn allowed_failures(&self, passing: usize, failing: usize) -> usize {
        if self.min_fraction <= 0.0 {
            return failing;
        }
        let allowed = (passing as f64 * (1.0 - self.min_fraction) / self.min_fraction).floor();
        (allowed as usize).min(failing)
    }
}

#[async_trait]
impl Reducer for ScreeningReducer {
    fn name(&self) -> &str {
        self.validator.name()
    }

    async fn reduce(&self, files: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
        let mut verdicts = Vec::with_capacity(files.len());
        for file in &files {
            let passed = match self.validator.validate(file).await {
                Ok(passed) => passed,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "Screening check errored, counting as failed");
                    false
                }
            };
            verdicts.push(passed);
        }

        let passing = verdicts.iter().filter(|v| **v).count();
        let failing = verdicts.len() - passing;
        let mut failures_left = self.allowed_failures(passing, failing);

        info!(
            screen = %self.validator.name(),
            passing,
            failing,
            keeping_failures = failures_left,
            min_fraction = self.min_fraction,
            "Screened candidates"
        );

        Ok(files
            .into_iter()
            .zip(verdicts)
            .filter_map(|(file, passed)| {
                if passed {
                    Some(file)
                } else if failures_left > 0 {
                    failures_left -= 1;
                    Some(file)
                } else {
                    None
                }
            })
            .collect())
    }
}
