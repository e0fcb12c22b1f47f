use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stills::batch::{BATCH_END_RATIO, BATCH_START_RATIO, DEFAULT_BATCH_SIZE};
use stills::config::{
    DestinationSpec, FilterSpec, PipelineConfig, ReducerSpec, SourceSpec, ValidatorSpec,
};
use stills::pipeline::MAX_GENERATION_ATTEMPTS;
use stills::sources::DEFAULT_VIDEO_PATTERN;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub videos: PathBuf,
    pub stills: PathBuf,
    /// Published stills. Also the set the batch runner skips.
    pub archive: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            videos: PathBuf::from("videos"),
            stills: PathBuf::from("stills"),
            archive: PathBuf::from("archive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningConfig {
    pub command: String,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub num: usize,
    pub pattern: String,
    pub start_ratio: f64,
    pub end_ratio: f64,
    pub screening: Option<ScreeningConfig>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            num: DEFAULT_BATCH_SIZE,
            pattern: DEFAULT_VIDEO_PATTERN.to_string(),
            start_ratio: BATCH_START_RATIO,
            end_ratio: BATCH_END_RATIO,
            screening: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_GENERATION_ATTEMPTS,
        }
    }
}

/// Application configuration, read from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub batch: BatchConfig,
    pub generation: GenerationConfig,
    /// Where `stills run` picks its video. Defaults to `paths.videos`.
    pub source: Option<SourceSpec>,
    pub validators: Vec<ValidatorSpec>,
    pub filters: Vec<FilterSpec>,
    pub destinations: Vec<DestinationSpec>,
    pub reducers: Vec<ReducerSpec>,
}

impl AppConfig {
    /// `<config dir>/stills/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("stills").join("config.toml"))
    }

    /// Load from `path`, or from the default location.
    ///
    /// An explicit path must exist. A missing default file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// The configured source, or the videos directory with the batch pattern.
    pub fn source(&self) -> SourceSpec {
        self.source.clone().unwrap_or_else(|| SourceSpec::Local {
            dir: self.paths.videos.clone(),
            pattern: self.batch.pattern.clone(),
        })
    }

    /// The library view of the configured collaborators.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            max_attempts: self.generation.max_attempts,
            validators: self.validators.clone(),
            filters: self.filters.clone(),
            destinations: self.destinations.clone(),
            reducers: self.reducers.clone(),
        }
    }
}
