//! Wrappers around the external media tools.
//!
//! ffmpeg/ffprobe handle video, ImageMagick's `convert`/`identify` handle
//! stills. Tool paths come from `FFMPEG_PATH`, `FFPROBE_PATH`,
//! `MAGICK_CONVERT_PATH` and `MAGICK_IDENTIFY_PATH`, defaulting to the bare
//! program names.

use std::path::Path;

use rand::RngExt;
use tracing::debug;

use crate::{Error, Result};

/// Dimensions and frame count of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub num_frames: u32,
}

/// Paths of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTools {
    pub ffmpeg: String,
    pub ffprobe: String,
    pub convert: String,
    pub identify: String,
}

impl Default for MediaTools {
    fn default() -> Self {
        Self::from_env()
    }
}

impl MediaTools {
    pub fn from_env() -> Self {
        let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.to_string());
        Self {
            ffmpeg: var("FFMPEG_PATH", "ffmpeg"),
            ffprobe: var("FFPROBE_PATH", "ffprobe"),
            convert: var("MAGICK_CONVERT_PATH", "convert"),
            identify: var("MAGICK_IDENTIFY_PATH", "identify"),
        }
    }

    /// Duration of a video in seconds.
    pub async fn video_length(&self, input: &str) -> Result<f64> {
        let mut cmd = process_utils::tokio_command(&self.ffprobe);
        cmd.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
            input,
        ]);
        let output = process_utils::run_checked(&mut cmd).await?;
        parse_duration(&output.stdout)
    }

    /// Width, height and frame count of an image.
    pub async fn image_info(&self, path: &Path) -> Result<ImageInfo> {
        let mut cmd = process_utils::tokio_command(&self.identify);
        cmd.arg("-format").arg("%w %h\\n").arg(path);
        let output = process_utils::run_checked(&mut cmd).await?;
        parse_image_info(&output.stdout)
    }

    /// Extract the frame at `secs` of `input` into `output`.
    pub async fn extract_frame(&self, input: &str, secs: f64, output: &Path) -> Result<()> {
        let mut cmd = process_utils::tokio_command(&self.ffmpeg);
        cmd.args([
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-ss",
            &format!("{secs:.3}"),
            "-i",
            input,
            "-vframes",
            "1",
            "-vf",
            "scale=iw*sar:ih",
        ])
        .arg(output);

        let result = process_utils::run_checked(&mut cmd).await?;
        debug!(
            output = %output.display(),
            duration_secs = result.duration_secs,
            "Frame extracted"
        );
        Ok(())
    }

    /// Run ImageMagick `convert` with `args`.
    pub async fn convert(&self, args: &[String]) -> Result<()> {
        let mut cmd = process_utils::tokio_command(&self.convert);
        cmd.args(args);
        process_utils::run_checked(&mut cmd).await?;
        Ok(())
    }
}

/// Pick a uniformly random timestamp in `[start_ratio, end_ratio]` of `length`.
pub fn random_timestamp(length: f64, start_ratio: f64, end_ratio: f64) -> f64 {
    let start = length * start_ratio.clamp(0.0, 1.0);
    let end = length * end_ratio.clamp(0.0, 1.0);
    if end <= start {
        return start;
    }
    rand::rng().random_range(start..end)
}

fn parse_duration(stdout: &str) -> Result<f64> {
    let text = stdout.lines().next().unwrap_or_default().trim();
    text.parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| Error::Other(format!("Unexpected ffprobe duration output: {text:?}")))
}

fn parse_image_info(stdout: &str) -> Result<ImageInfo> {
    let frames: Vec<&str> = stdout.lines().filter(|l| !l.trim().is_empty()).collect();
    let first = frames
        .first()
        .ok_or_else(|| Error::Other("identify printed nothing".to_string()))?;

    let mut parts = first.split_whitespace().map(str::parse::<u32>);
    match (parts.next(), parts.next()) {
        (Some(Ok(width)), Some(Ok(height))) => Ok(ImageInfo {
            width,
            height,
            num_frames: frames.len() as u32,
        }),
        _ => Err(Error::Other(format!(
            "Unexpected identify output: {first:?}"
        ))),
    }
}
