//! Random video from a local directory.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::pick;
use crate::pipeline::{Source, SourceResult};
use crate::utils::filename::stem;
use crate::utils::pattern::find_files_blocking;
use crate::{Error, Result};

/// Default pattern for video files.
pub const DEFAULT_VIDEO_PATTERN: &str = "**/*.{mp4,avi,mov,mkv}";

/// Picks a random file under `root` matching a glob pattern.
///
/// The output name is the file stem.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
    pattern: String,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pattern: DEFAULT_VIDEO_PATTERN.to_string(),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }
}

#[async_trait]
impl Source for LocalSource {
    fn name(&self) -> &str {
        "local"
    }

    async fn get(&self) -> Result<SourceResult> {
        let videos = find_files_blocking(&self.root, &self.pattern).await?;
        debug!(root = %self.root.display(), count = videos.len(), "Found videos");

        let video = pick(&videos).ok_or_else(|| {
            Error::source_failed(format!(
                "no files matching {} under {}",
                self.pattern,
                self.root.display()
            ))
        })?;

        let output = stem(video).unwrap_or_else(|| "unnamed".to_string());
        Ok(SourceResult::new(video.to_string_lossy(), output))
    }
}
