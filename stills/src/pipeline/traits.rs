//! Capability traits implemented by concrete pipeline steps.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::result::{PublishResponse, RunResult, SourceResult};
use crate::Result;

/// Picks the input a run generates content from.
#[async_trait]
pub trait Source: Send + Sync {
    /// Get the source name (for logging).
    fn name(&self) -> &str;

    /// Fetch the next input.
    async fn get(&self) -> Result<SourceResult>;
}

/// Produces a candidate artifact from a source input.
///
/// The generation loop may call `generate` several times per run, so each
/// call should produce a fresh file.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Generate an artifact for `input`, naming it after `output`.
    async fn generate(&self, input: &str, output: &str) -> Result<PathBuf>;
}

/// Decides whether an artifact is acceptable.
///
/// Validators only read the artifact; the gate runs them concurrently.
#[async_trait]
pub trait Validator: Send + Sync {
    fn name(&self) -> &str;

    async fn validate(&self, artifact: &Path) -> Result<bool>;
}

/// Context handed to a filter alongside the artifact.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// The result of the run so far.
    pub result: &'a RunResult,
}

impl<'a> FilterContext<'a> {
    pub fn new(result: &'a RunResult) -> Self {
        Self { result }
    }

    /// Look up a string value in the source metadata.
    pub fn source_metadata(&self, key: &str) -> Option<&'a str> {
        self.result
            .source
            .as_ref()
            .and_then(|s| s.metadata.get(key))
            .and_then(|v| v.as_str())
    }
}

/// Transforms an artifact.
///
/// # Side effects
///
/// Filters rewrite the artifact file in place. Later filters and destinations
/// see the mutated file, which is why the orchestrator never runs two filters
/// at the same time.
#[async_trait]
pub trait Filter: Send + Sync {
    fn name(&self) -> &str;

    /// Apply the filter. `Some(value)` is recorded in the run result under the
    /// filter's name.
    async fn apply(
        &self,
        artifact: &Path,
        ctx: FilterContext<'_>,
    ) -> Result<Option<serde_json::Value>>;
}

/// What a destination receives along with the artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishOptions {
    pub tags: Vec<String>,
    pub text: Option<String>,
}

/// Publishes an artifact somewhere.
#[async_trait]
pub trait Destination: Send + Sync {
    fn name(&self) -> &str;

    async fn publish(
        &self,
        artifact: &Path,
        options: &PublishOptions,
    ) -> Result<Option<PublishResponse>>;
}
