//! Configuration of a single pipeline run.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::generation::MAX_GENERATION_ATTEMPTS;
use super::result::RunResult;
use super::traits::{ContentGenerator, Destination, Filter, Source, Validator};

/// Computes the text published alongside the artifact.
///
/// Called after the filters ran, so it sees tags and filter outputs but no
/// destination responses.
pub type PostTextFn = Arc<dyn Fn(&RunResult) -> Option<String> + Send + Sync>;

/// Everything one call to [`generate`](super::generate) needs.
///
/// Either `image` is set and generation is skipped, or both `source` and
/// `content` are set and an artifact is generated.
#[derive(Clone)]
pub struct RunConfig {
    pub source: Option<Arc<dyn Source>>,
    pub content: Option<Arc<dyn ContentGenerator>>,
    pub image: Option<PathBuf>,
    pub filters: Vec<Arc<dyn Filter>>,
    pub destinations: Vec<Arc<dyn Destination>>,
    pub validators: Vec<Arc<dyn Validator>>,
    pub post_text: Option<PostTextFn>,
    pub max_attempts: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source: None,
            content: None,
            image: None,
            filters: Vec::new(),
            destinations: Vec::new(),
            validators: Vec::new(),
            post_text: None,
            max_attempts: MAX_GENERATION_ATTEMPTS,
        }
    }
}

impl RunConfig {
    /// A run that generates its artifact from `source` with `content`.
    pub fn generated(source: Arc<dyn Source>, content: Arc<dyn ContentGenerator>) -> Self {
        Self {
            source: Some(source),
            content: Some(content),
            ..Self::default()
        }
    }

    /// A run over an existing image; nothing is generated.
    pub fn for_image(image: impl Into<PathBuf>) -> Self {
        Self {
            image: Some(image.into()),
            ..Self::default()
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn with_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_destination(mut self, destination: Arc<dyn Destination>) -> Self {
        self.destinations.push(destination);
        self
    }

    pub fn with_post_text<F>(mut self, f: F) -> Self
    where
        F: Fn(&RunResult) -> Option<String> + Send + Sync + 'static,
    {
        self.post_text = Some(Arc::new(f));
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("source", &self.source.as_ref().map(|s| s.name().to_string()))
            .field("content", &self.content.as_ref().map(|c| c.name().to_string()))
            .field("image", &self.image)
            .field(
                "filters",
                &self.filters.iter().map(|x| x.name()).collect::<Vec<_>>(),
            )
            .field(
                "destinations",
                &self.destinations.iter().map(|x| x.name()).collect::<Vec<_>>(),
            )
            .field(
                "validators",
                &self.validators.iter().map(|x| x.name()).collect::<Vec<_>>(),
            )
            .field("post_text", &self.post_text.is_some())
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}
