//! Declarative pipeline configuration.
//!
//! Each spec is an internally tagged enum (`type = "..."`) that builds the
//! matching capability object.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::batch::{
    BatchPipeline, CommandReducer, CommandReducerConfig, DupesReducer, Reducer, ScreeningReducer,
    published_names,
};
use crate::destinations::{DirectoryConfig, DirectoryDestination, WebhookConfig, WebhookDestination};
use crate::filters::{CaptionsConfig, CaptionsFilter, ImplodeFilter, OverlayConfig, OverlayFilter};
use crate::pipeline::{Destination, Filter, MAX_GENERATION_ATTEMPTS, RunConfig, Source, Validator};
use crate::sources::{DEFAULT_VIDEO_PATTERN, LocalSource, UrlListSource};
use crate::validators::{CommandValidator, CommandValidatorConfig, FileSizeValidator};

fn default_video_pattern() -> String {
    DEFAULT_VIDEO_PATTERN.to_string()
}

/// Where a generated run picks its video from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceSpec {
    Local {
        dir: PathBuf,
        #[serde(default = "default_video_pattern")]
        pattern: String,
    },
    Urls {
        urls: Vec<String>,
        /// Regex a URL must match to be picked.
        #[serde(default)]
        filter: Option<String>,
    },
}

impl SourceSpec {
    pub fn build(&self) -> Result<Arc<dyn Source>> {
        Ok(match self {
            Self::Local { dir, pattern } => {
                Arc::new(LocalSource::new(dir).with_pattern(pattern.as_str()))
            }
            Self::Urls { urls, filter } => {
                let mut source = UrlListSource::new(urls.clone());
                if let Some(filter) = filter {
                    source = source.with_filter(filter)?;
                }
                Arc::new(source)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorSpec {
    FileSize { min_bytes: u64 },
    Command(CommandValidatorConfig),
}

impl ValidatorSpec {
    pub fn build(&self) -> Arc<dyn Validator> {
        match self {
            Self::FileSize { min_bytes } => Arc::new(FileSizeValidator::new(*min_bytes)),
            Self::Command(config) => Arc::new(CommandValidator::from_config(config.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FilterSpec {
    Captions(CaptionsConfig),
    Overlay(OverlayConfig),
    Implode {
        #[serde(default)]
        rate: Option<f64>,
    },
}

impl FilterSpec {
    pub fn build(&self) -> Result<Arc<dyn Filter>> {
        Ok(match self {
            Self::Captions(config) => Arc::new(CaptionsFilter::new(config.clone())),
            Self::Overlay(config) => Arc::new(OverlayFilter::new(config.clone())?),
            Self::Implode { rate } => Arc::new(ImplodeFilter::new(*rate)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DestinationSpec {
    Directory(DirectoryConfig),
    Webhook(WebhookConfig),
}

impl DestinationSpec {
    pub fn build(&self) -> Result<Arc<dyn Destination>> {
        Ok(match self {
            Self::Directory(config) => Arc::new(DirectoryDestination::new(config.clone())),
            Self::Webhook(config) => Arc::new(WebhookDestination::new(config.clone())?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReducerSpec {
    /// Drop stills already present in `dir`.
    Dupes { dir: PathBuf },
    Screening { percent: u8, validator: ValidatorSpec },
    Command(CommandReducerConfig),
}

impl ReducerSpec {
    /// Dupes reads the published set from disk, hence async.
    pub async fn build(&self) -> Result<Arc<dyn Reducer>> {
        Ok(match self {
            Self::Dupes { dir } => Arc::new(DupesReducer::new(published_names(dir).await?)),
            Self::Screening { percent, validator } => {
                Arc::new(ScreeningReducer::from_percent(validator.build(), *percent))
            }
            Self::Command(config) => Arc::new(CommandReducer::from_config(config.clone())),
        })
    }
}

fn default_max_attempts() -> u32 {
    MAX_GENERATION_ATTEMPTS
}

/// Collaborators of a run and of a batch, as found in a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default)]
    pub validators: Vec<ValidatorSpec>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
    #[serde(default)]
    pub destinations: Vec<DestinationSpec>,
    #[serde(default)]
    pub reducers: Vec<ReducerSpec>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            validators: Vec::new(),
            filters: Vec::new(),
            destinations: Vec::new(),
            reducers: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Add the configured validators, filters and destinations to `config`.
    ///
    /// Order is kept, so filters apply in the order they are listed.
    pub fn apply_to(&self, mut config: RunConfig) -> Result<RunConfig> {
        for validator in &self.validators {
            config.validators.push(validator.build());
        }
        for filter in &self.filters {
            config.filters.push(filter.build()?);
        }
        for destination in &self.destinations {
            config.destinations.push(destination.build()?);
        }
        Ok(config.with_max_attempts(self.max_attempts))
    }

    /// Append the configured reducers to `pipeline`.
    pub async fn extend_batch(&self, mut pipeline: BatchPipeline) -> Result<BatchPipeline> {
        for reducer in &self.reducers {
            pipeline.push(reducer.build().await?);
        }
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
max_attempts = 3

[[validators]]
type = "file_size"
min_bytes = 2048

[[validators]]
type = "command"
name = "faces"
command = "detect-faces {input}"

[[filters]]
type = "captions"
text = "hello"
background = "black"

[[filters]]
type = "implode"

[[filters]]
type = "overlay"
overlay_file = "logo.png"
opacity = 50

[[destinations]]
type = "directory"
dir = "/archive"

[[destinations]]
type = "webhook"
url = "https://example.com/hook"

[[reducers]]
type = "screening"
percent = 50
validator = { type = "file_size", min_bytes = 10 }

[[reducers]]
type = "command"
name = "similarity"
command = "dedupe-similar"
"#;

    #[test]
    fn test_parse_config() {
        let config: PipelineConfig = toml::from_str(CONFIG).unwrap();

        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.validators[0], ValidatorSpec::FileSize { min_bytes: 2048 });
        assert!(matches!(&config.validators[1], ValidatorSpec::Command(c) if c.name == "faces"));

        match &config.filters[0] {
            FilterSpec::Captions(captions) => {
                assert_eq!(captions.text.as_deref(), Some("hello"));
                assert_eq!(captions.shadow_offset, 1);
                assert_eq!(captions.color, "white");
            }
            other => panic!("unexpected filter {other:?}"),
        }
        assert_eq!(config.filters[1], FilterSpec::Implode { rate: None });
        assert!(matches!(&config.filters[2], FilterSpec::Overlay(o) if o.opacity == 50 && o.gravity == "center"));

        assert!(matches!(&config.destinations[0], DestinationSpec::Directory(d) if d.sidecar));
        assert!(matches!(&config.destinations[1], DestinationSpec::Webhook(w) if w.method == "POST"));

        assert_eq!(
            config.reducers[0],
            ReducerSpec::Screening {
                percent: 50,
                validator: ValidatorSpec::FileSize { min_bytes: 10 }
            }
        );
    }

    #[test]
    fn test_empty_config_defaults() {
        let config: PipelineConfig = toml::from_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.max_attempts, MAX_GENERATION_ATTEMPTS);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: std::result::Result<PipelineConfig, _> =
            toml::from_str("[[filters]]\ntype = \"sepia\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_to_run_config() {
        let config: PipelineConfig = toml::from_str(CONFIG).unwrap();
        let run = config.apply_to(RunConfig::for_image("a.png")).unwrap();

        assert_eq!(run.validators.len(), 2);
        let names: Vec<&str> = run.filters.iter().map(|f| f.name()).collect();
        assert_eq!(names, ["captions", "implode", "overlay"]);
        assert_eq!(run.destinations.len(), 2);
        assert_eq!(run.max_attempts, 3);
    }

    #[test]
    fn test_parse_source_specs() {
        let local: SourceSpec = toml::from_str("type = \"local\"\ndir = \"/videos\"\n").unwrap();
        assert_eq!(
            local,
            SourceSpec::Local {
                dir: PathBuf::from("/videos"),
                pattern: DEFAULT_VIDEO_PATTERN.to_string(),
            }
        );
        assert_eq!(local.build().unwrap().name(), "local");

        let urls: SourceSpec = toml::from_str(
            r#"
type = "urls"
urls = ["https://cdn.example.com/a/The%20Film.mp4", "https://cdn.example.com/b/skip.mp4"]
filter = "/a/"
"#,
        )
        .unwrap();
        assert!(matches!(&urls, SourceSpec::Urls { urls, filter } if urls.len() == 2 && filter.as_deref() == Some("/a/")));
        assert_eq!(urls.build().unwrap().name(), "urls");
    }

    #[tokio::test]
    async fn test_url_source_spec_picks_filtered_url() {
        let spec = SourceSpec::Urls {
            urls: vec![
                "https://cdn.example.com/a/The%20Film.mp4".to_string(),
                "https://cdn.example.com/b/skip.mp4".to_string(),
            ],
            filter: Some("/a/".to_string()),
        };

        let picked = spec.build().unwrap().get().await.unwrap();
        assert_eq!(picked.output, "The Film");
    }

    #[test]
    fn test_bad_url_filter_is_configuration_error() {
        let spec = SourceSpec::Urls {
            urls: Vec::new(),
            filter: Some("(".to_string()),
        };
        assert!(spec.build().err().unwrap().is_configuration());
    }

    #[tokio::test]
    async fn test_extend_batch() {
        let temp = TempDir::new().unwrap();
        let specs = PipelineConfig {
            reducers: vec![
                ReducerSpec::Dupes {
                    dir: temp.path().to_path_buf(),
                },
                ReducerSpec::Command(CommandReducerConfig {
                    name: "similarity".to_string(),
                    command: "cat".to_string(),
                }),
            ],
            ..PipelineConfig::default()
        };

        let pipeline = specs.extend_batch(BatchPipeline::new()).await.unwrap();
        assert_eq!(pipeline.reducer_names(), ["dupes", "similarity"]);
    }
}
