//! Still generator: extracts one frame at a random timestamp.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Result;
use crate::media::{MediaTools, random_timestamp};
use crate::pipeline::ContentGenerator;
use crate::utils::filename::still_filename;
use crate::utils::fs::ensure_dir_all;

fn default_start_ratio() -> f64 {
    0.0
}

fn default_end_ratio() -> f64 {
    1.0
}

/// Configuration for still extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StillConfig {
    /// Directory the stills are written to.
    pub output_dir: PathBuf,
    /// Earliest point of the video to sample, as a fraction of its length.
    #[serde(default = "default_start_ratio")]
    pub start_ratio: f64,
    /// Latest point of the video to sample, as a fraction of its length.
    #[serde(default = "default_end_ratio")]
    pub end_ratio: f64,
}

impl StillConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            start_ratio: default_start_ratio(),
            end_ratio: default_end_ratio(),
        }
    }

    pub fn with_window(mut self, start_ratio: f64, end_ratio: f64) -> Self {
        self.start_ratio = start_ratio;
        self.end_ratio = end_ratio;
        self
    }
}

/// Generates PNG stills named `"<output> @ <sec>s.png"`.
pub struct StillGenerator {
    config: StillConfig,
    tools: MediaTools,
}

impl StillGenerator {
    pub fn new(config: StillConfig) -> Self {
        Self::with_tools(config, MediaTools::from_env())
    }

    pub fn with_tools(config: StillConfig, tools: MediaTools) -> Self {
        Self { config, tools }
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Where a still of `output` at `secs` goes.
    pub fn still_path(&self, output: &str, secs: f64) -> PathBuf {
        self.config.output_dir.join(still_filename(output, secs))
    }
}

#[async_trait]
impl ContentGenerator for StillGenerator {
    fn name(&self) -> &str {
        "still"
    }

    async fn generate(&self, input: &str, output: &str) -> Result<PathBuf> {
        info!(output = %output, "Processing");

        let length = self.tools.video_length(input).await?;
        let secs = random_timestamp(length, self.config.start_ratio, self.config.end_ratio);
        let path = self.still_path(output, secs);

        ensure_dir_all(&self.config.output_dir).await?;
        info!(still = %path.display(), at_secs = secs, "Generating image");
        self.tools.extract_frame(input, secs, &path).await?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: StillConfig = serde_json::from_str(r#"{"output_dir": "/stills"}"#).unwrap();
        assert_eq!(config, StillConfig::new("/stills"));
        assert_eq!(config.start_ratio, 0.0);
        assert_eq!(config.end_ratio, 1.0);
    }

    #[test]
    fn test_still_path() {
        let generator = StillGenerator::new(StillConfig::new("/stills").with_window(0.2, 0.8));
        assert_eq!(
            generator.still_path("Big Movie", 61.7),
            PathBuf::from("/stills/Big Movie @ 62s.png")
        );
        assert_eq!(generator.name(), "still");
    }

    #[tokio::test]
    async fn test_missing_ffprobe_fails() {
        let tools = MediaTools {
            ffprobe: "definitely-not-ffprobe-xyz".to_string(),
            ..MediaTools::from_env()
        };
        let generator = StillGenerator::with_tools(StillConfig::new("/tmp"), tools);
        let err = generator.generate("in.mp4", "in").await.unwrap_err();
        assert!(matches!(err, crate::Error::Command(_)));
    }
}
