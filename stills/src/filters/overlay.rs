//! Overlay filter: composites another image over the still.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::media::{ImageInfo, MediaTools};
use crate::pipeline::{Filter, FilterContext};
use crate::{Error, Result};

fn default_gravity() -> String {
    "center".to_string()
}

fn default_opacity() -> u8 {
    100
}

fn default_dither() -> String {
    "None".to_string()
}

fn default_gif_colors() -> u32 {
    64
}

/// Configuration for the overlay filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Image placed on top of the still.
    pub overlay_file: PathBuf,
    #[serde(default = "default_gravity")]
    pub gravity: String,
    /// Explicit ImageMagick geometry for the overlay size.
    #[serde(default)]
    pub size: Option<String>,
    /// Overlay width as a percentage of the still's width.
    #[serde(default)]
    pub size_percent_width: Option<f64>,
    /// Overlay height as a percentage of the still's height.
    #[serde(default)]
    pub size_percent_height: Option<f64>,
    #[serde(default)]
    pub geometry: Option<String>,
    #[serde(default)]
    pub compose: Option<String>,
    /// 0 to 100.
    #[serde(default = "default_opacity")]
    pub opacity: u8,
    #[serde(default)]
    pub grayscale: bool,
    #[serde(default = "default_dither")]
    pub dither: String,
    /// Palette size for the overlay when the still is animated.
    #[serde(default = "default_gif_colors")]
    pub gif_colors: u32,
}

impl OverlayConfig {
    pub fn new(overlay_file: impl Into<PathBuf>) -> Self {
        Self {
            overlay_file: overlay_file.into(),
            gravity: default_gravity(),
            size: None,
            size_percent_width: None,
            size_percent_height: None,
            geometry: None,
            compose: None,
            opacity: default_opacity(),
            grayscale: false,
            dither: default_dither(),
            gif_colors: default_gif_colors(),
        }
    }

    /// Resize geometry for the overlay. Covers the whole still by default.
    fn resize_geometry(&self, info: &ImageInfo) -> String {
        if let Some(size) = &self.size {
            return size.clone();
        }
        if let Some(pct) = self.size_percent_width {
            return format!("{:.0}x", f64::from(info.width) * pct / 100.0);
        }
        if let Some(pct) = self.size_percent_height {
            return format!("x{:.0}", f64::from(info.height) * pct / 100.0);
        }
        format!("{}x{}^", info.width, info.height)
    }
}

pub struct OverlayFilter {
    config: OverlayConfig,
    tools: MediaTools,
}

impl OverlayFilter {
    pub fn new(config: OverlayConfig) -> Result<Self> {
        Self::with_tools(config, MediaTools::from_env())
    }

    pub fn with_tools(config: OverlayConfig, tools: MediaTools) -> Result<Self> {
        if config.opacity > 100 {
            return Err(Error::config(format!(
                "Overlay opacity must be between 0 and 100, got {}",
                config.opacity
            )));
        }
        Ok(Self { config, tools })
    }

    fn args(&self, file: &Path, info: &ImageInfo) -> Vec<String> {
        let config = &self.config;
        let file = file.to_string_lossy().into_owned();

        let mut args = vec![
            file.clone(),
            "-coalesce".to_string(),
            "null:".to_string(),
            "(".to_string(),
            "(".to_string(),
            config.overlay_file.to_string_lossy().into_owned(),
        ];
        if info.num_frames > 1 {
            args.extend(["-colors".to_string(), config.gif_colors.to_string()]);
        }
        args.push(")".to_string());

        if config.grayscale {
            args.extend(["-modulate".to_string(), "100,0".to_string()]);
        }
        args.extend(["-resize".to_string(), config.resize_geometry(info)]);
        if config.opacity < 100 {
            args.extend([
                "-alpha".to_string(),
                "set".to_string(),
                "-channel".to_string(),
                "A".to_string(),
                "+level".to_string(),
                format!("0,{}%", config.opacity),
                "+channel".to_string(),
            ]);
        }
        args.push(")".to_string());

        args.extend(["-gravity".to_string(), config.gravity.clone()]);
        if let Some(geometry) = &config.geometry {
            args.extend(["-geometry".to_string(), geometry.clone()]);
        }
        if let Some(compose) = &config.compose {
            args.extend(["-compose".to_string(), compose.clone()]);
        }
        args.extend([
            "-dither".to_string(),
            config.dither.clone(),
            "-layers".to_string(),
            "composite".to_string(),
            file,
        ]);
        args
    }
}

#[async_trait]
impl Filter for OverlayFilter {
    fn name(&self) -> &str {
        "overlay"
    }

    async fn apply(
        &self,
        artifact: &Path,
        _ctx: FilterContext<'_>,
    ) -> Result<Option<serde_json::Value>> {
        let info = self.tools.image_info(artifact).await?;
        info!(
            overlay = %self.config.overlay_file.display(),
            frames = info.num_frames,
            "Applying overlay"
        );
        self.tools.convert(&self.args(artifact, &info)).await?;
        Ok(None)
    }
}
