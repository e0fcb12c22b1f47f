//! Batch still generation from a directory of videos.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::pipeline::{BatchOutcome, BatchPipeline};
use crate::content::{StillConfig, StillGenerator};
use crate::media::MediaTools;
use crate::pipeline::ContentGenerator;
use crate::sources::{DEFAULT_VIDEO_PATTERN, pick};
use crate::utils::filename::stem;
use crate::utils::pattern::find_files_blocking;
use crate::{Error, Result};

pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const BATCH_START_RATIO: f64 = 0.2;
pub const BATCH_END_RATIO: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub struct StillBatchConfig {
    pub videos_dir: PathBuf,
    pub stills_dir: PathBuf,
    pub pattern: String,
    pub count: usize,
    pub start_ratio: f64,
    pub end_ratio: f64,
}

impl StillBatchConfig {
    pub fn new(videos_dir: impl Into<PathBuf>, stills_dir: impl Into<PathBuf>) -> Self {
        Self {
            videos_dir: videos_dir.into(),
            stills_dir: stills_dir.into(),
            pattern: DEFAULT_VIDEO_PATTERN.to_string(),
            count: DEFAULT_BATCH_SIZE,
            start_ratio: BATCH_START_RATIO,
            end_ratio: BATCH_END_RATIO,
        }
    }
}

/// Generates a set of stills from random videos, sampling away from the
/// start and end of each video.
pub struct StillBatch {
    config: StillBatchConfig,
    generator: StillGenerator,
}

impl StillBatch {
    pub fn new(config: StillBatchConfig) -> Self {
        Self::with_tools(config, MediaTools::from_env())
    }

    pub fn with_tools(config: StillBatchConfig, tools: MediaTools) -> Self {
        let still_config = StillConfig::new(&config.stills_dir)
            .with_window(config.start_ratio, config.end_ratio);
        Self {
            generator: StillGenerator::with_tools(still_config, tools),
            config,
        }
    }

    pub fn stills_dir(&self) -> &Path {
        &self.config.stills_dir
    }

    /// Generate up to `count` distinct stills.
    ///
    /// A pick that reproduces an earlier still's path is dropped. A video that fails to produce a still is skipped. The batch fails only
    /// if no still could be made at all.
    pub async fn generate(&self) -> Result<Vec<PathBuf>> {
        let videos = find_files_blocking(&self.config.videos_dir, &self.config.pattern).await?;
        info!(
            videos_dir = %self.config.videos_dir.display(),
            videos = videos.len(),
            count = self.config.count,
            "Generating batch"
        );

        let mut stills = Vec::with_capacity(self.config.count);
        let mut last_error = None;
        for _ in 0..self.config.count {
            let Some(video) = pick(&videos) else {
                return Err(Error::source_failed(format!(
                    "no files matching {} under {}",
                    self.config.pattern,
                    self.config.videos_dir.display()
                )));
            };
            let output = stem(video).unwrap_or_else(|| "unnamed".to_string());

            match self.generator.generate(&video.to_string_lossy(), &output).await {
                // Names have whole-second resolution, so a repeat pick can land on the same file.
                Ok(still) if stills.contains(&still) => {
                    debug!(still = %still.display(), "Skipping duplicate still");
                }
                Ok(still) => stills.push(still),
                Err(e) => {
                    warn!(video = %video.display(), error = %e, "Failed to generate still");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if stills.is_empty() => Err(e),
            _ => Ok(stills),
        }
    }

    /// Generate a batch and run it through `pipeline`.
    pub async fn run(&self, pipeline: &BatchPipeline) -> Result<BatchOutcome> {
        let stills = self.generate().await?;
        pipeline.run(stills).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::batch::DupesReducer;
    use itertools::Itertools;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_script(dir: &Path, name: &str, body: &str) -> String {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().into_owned()
    }

    /// ffprobe reports 100s and ffmpeg writes a stub still to its last argument.
    fn fake_tools(dir: &Path) -> MediaTools {
        MediaTools {
            ffprobe: write_script(dir, "ffprobe", "echo 100.0"),
            ffmpeg: write_script(dir, "ffmpeg", "for last; do :; done\necho png > \"$last\""),
            ..MediaTools::from_env()
        }
    }

    #[tokio::test]
    async fn test_generate_batch() {
        let temp = TempDir::new().unwrap();
        let videos = temp.path().join("videos");
        std::fs::create_dir_all(&videos).unwrap();
        std::fs::write(videos.join("Movie.mkv"), b"").unwrap();

        let config = StillBatchConfig {
            count: 3,
            ..StillBatchConfig::new(&videos, temp.path().join("stills"))
        };
        let stills = StillBatch::with_tools(config, fake_tools(temp.path()))
            .generate()
            .await
            .unwrap();

        assert!((1..=3).contains(&stills.len()));
        assert_eq!(stills.iter().unique().count(), stills.len());
        for still in &stills {
            assert!(still.exists());
            let name = still.file_name().unwrap().to_string_lossy();
            assert!(name.starts_with("Movie @ "));
            let secs: u32 = name["Movie @ ".len()..name.len() - "s.png".len()]
                .parse()
                .unwrap();
            assert!((20..=80).contains(&secs));
        }
    }

    #[tokio::test]
    async fn test_repeat_picks_are_deduplicated() {
        let temp = TempDir::new().unwrap();
        let videos = temp.path().join("videos");
        std::fs::create_dir_all(&videos).unwrap();
        std::fs::write(videos.join("Movie.mp4"), b"").unwrap();

        let config = StillBatchConfig {
            count: 3,
            start_ratio: 0.5,
            end_ratio: 0.5,
            ..StillBatchConfig::new(&videos, temp.path().join("stills"))
        };
        let stills = StillBatch::with_tools(config, fake_tools(temp.path()))
            .generate()
            .await
            .unwrap();

        assert_eq!(stills, vec![temp.path().join("stills/Movie @ 50s.png")]);
    }

    #[tokio::test]
    async fn test_run_through_pipeline() {
        let temp = TempDir::new().unwrap();
        let videos = temp.path().join("videos");
        std::fs::create_dir_all(&videos).unwrap();
        std::fs::write(videos.join("Movie.mp4"), b"").unwrap();

        let config = StillBatchConfig {
            count: 1,
            start_ratio: 0.5,
            end_ratio: 0.5,
            ..StillBatchConfig::new(&videos, temp.path().join("stills"))
        };
        let pipeline = BatchPipeline::new().add_reducer(DupesReducer::new(["Movie @ 50s.png"]));
        let outcome = StillBatch::with_tools(config, fake_tools(temp.path()))
            .run(&pipeline)
            .await
            .unwrap();

        assert!(outcome.files.is_empty());
        assert!(!temp.path().join("stills/Movie @ 50s.png").exists());
    }

    #[tokio::test]
    async fn test_no_videos_fails() {
        let temp = TempDir::new().unwrap();
        let batch = StillBatch::with_tools(
            StillBatchConfig::new(temp.path(), temp.path().join("stills")),
            fake_tools(temp.path()),
        );
        let err = batch.generate().await.unwrap_err();
        assert!(matches!(err, Error::Source(_)));
    }

    #[tokio::test]
    async fn test_all_failures_propagate() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.mp4"), b"").unwrap();
        let tools = MediaTools {
            ffprobe: write_script(temp.path(), "ffprobe-broken", "exit 1"),
            ..fake_tools(temp.path())
        };
        let err = StillBatch::with_tools(
            StillBatchConfig::new(temp.path(), temp.path().join("stills")),
            tools,
        )
        .generate()
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Command(_)));
    }
}
