//! Captions filter: burns text into the bottom of a still.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;
use crate::media::MediaTools;
use crate::pipeline::{Filter, FilterContext};

/// Source metadata key a caption can come from.
pub const CAPTION_METADATA_KEY: &str = "caption";

/// Average glyph width as a fraction of the point size, used to estimate how
/// many characters fit on a line.
const GLYPH_WIDTH_RATIO: f64 = 0.55;

fn default_font() -> Option<PathBuf> {
    Some(PathBuf::from("./fonts/arial.ttf"))
}

fn default_shadow_offset() -> u32 {
    1
}

fn default_color() -> String {
    "white".to_string()
}

/// Configuration for caption burn-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionsConfig {
    /// Fixed caption text. When absent the source's `caption` metadata is used.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_font")]
    pub font: Option<PathBuf>,
    /// Box color behind the text. Without it the text gets a drop shadow.
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default = "default_shadow_offset")]
    pub shadow_offset: u32,
    /// Extra spacing between lines, 0 for the font default.
    #[serde(default)]
    pub line_height: i32,
    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self {
            text: None,
            font: default_font(),
            background: None,
            shadow_offset: default_shadow_offset(),
            line_height: 0,
            color: default_color(),
        }
    }
}

/// One text layer of the `convert` invocation.
#[derive(Debug, Clone, Copy)]
struct TextLayer<'a> {
    color: &'a str,
    background: &'a str,
    offset: u32,
}

pub struct CaptionsFilter {
    config: CaptionsConfig,
    tools: MediaTools,
}

impl CaptionsFilter {
    pub fn new(config: CaptionsConfig) -> Self {
        Self::with_tools(config, MediaTools::from_env())
    }

    pub fn with_tools(config: CaptionsConfig, tools: MediaTools) -> Self {
        if let Some(font) = &config.font
            && !font.exists()
        {
            warn!(font = %font.display(), "Font does not exist");
        }
        Self { config, tools }
    }

    fn font_size(caption: &str, width: u32) -> f64 {
        let divisor = if is_uppercasy(caption) { 22.0 } else { 20.0 };
        f64::from(width) / divisor
    }

    /// Characters that fit on one line of the caption box.
    fn max_line_chars(caption: &str, width: u32) -> usize {
        let box_width = f64::from(width) * 0.8;
        let glyph = Self::font_size(caption, width) * GLYPH_WIDTH_RATIO;
        (box_width / glyph).floor().max(1.0) as usize
    }

    /// Wrap captions that would not fit on the lines they were written for.
    ///
    /// A one-line caption that overflows is split into two balanced lines. If
    /// even that overflows, the caption is flattened and ImageMagick wraps it.
    fn smart_wrap(caption: &str, width: u32) -> String {
        let max = Self::max_line_chars(caption, width);
        let fits = |text: &str| text.lines().all(|l| l.chars().count() <= max);

        if fits(caption) {
            return caption.to_string();
        }

        let wrapped = wrap_caption(caption);
        if wrapped.lines().count() <= 2 && fits(&wrapped) {
            debug!(max_line_chars = max, "Wrapped caption onto two lines");
            return wrapped;
        }

        debug!(max_line_chars = max, "Caption too long to balance, letting convert wrap it");
        collapse_whitespace(&caption.replace('\n', " "))
    }

    fn text_args(&self, caption: &str, width: u32, layer: TextLayer<'_>) -> Vec<String> {
        let font_size = Self::font_size(caption, width);
        let box_width = f64::from(width) * 0.8;
        let padding = font_size;
        let offset_y = padding - f64::from(layer.offset);

        let mut args = vec!["-pointsize".to_string(), format!("{font_size:.2}")];
        if let Some(font) = &self.config.font {
            args.push("-font".to_string());
            args.push(font.to_string_lossy().into_owned());
        }
        args.extend([
            "-size".to_string(),
            format!("{box_width:.0}x"),
            "-gravity".to_string(),
            "South".to_string(),
            "-fill".to_string(),
            layer.color.to_string(),
        ]);
        if self.config.line_height != 0 {
            args.push("-interline-spacing".to_string());
            args.push(self.config.line_height.to_string());
        }
        args.extend([
            "-background".to_string(),
            "none".to_string(),
            "-undercolor".to_string(),
            layer.background.to_string(),
            format!("caption:{}", escape_caption(caption)),
            "-geometry".to_string(),
            format!("+{}+{:.0}", layer.offset, offset_y),
        ]);
        args
    }

    /// Full `convert` argument list for captioning `file` in place.
    fn still_args(&self, file: &Path, caption: &str, width: u32) -> Vec<String> {
        let file = file.to_string_lossy().into_owned();
        let mut args = vec![file.clone()];

        match &self.config.background {
            Some(background) => {
                args.extend(self.text_args(
                    caption,
                    width,
                    TextLayer {
                        color: &self.config.color,
                        background,
                        offset: 0,
                    },
                ));
                args.push("-composite".to_string());
            }
            None => {
                args.extend(self.text_args(
                    caption,
                    width,
                    TextLayer {
                        color: "black",
                        background: "none",
                        offset: self.config.shadow_offset,
                    },
                ));
                args.push("-composite".to_string());
                args.extend(self.text_args(
                    caption,
                    width,
                    TextLayer {
                        color: &self.config.color,
                        background: "none",
                        offset: 0,
                    },
                ));
                args.extend(["-composite".to_string(), "-dither".to_string(), "None".to_string()]);
            }
        }

        args.push(file);
        args
    }

    fn resolve_caption(&self, ctx: &FilterContext<'_>) -> Option<String> {
        let raw = self
            .config
            .text
            .as_deref()
            .or_else(|| ctx.source_metadata(CAPTION_METADATA_KEY))?;
        let cleaned = raw.replace('*', "").replace('\u{2010}', "-");
        (!cleaned.trim().is_empty()).then_some(cleaned)
    }
}

#[async_trait]
impl Filter for CaptionsFilter {
    fn name(&self) -> &str {
        "captions"
    }

    async fn apply(
        &self,
        artifact: &Path,
        ctx: FilterContext<'_>,
    ) -> Result<Option<serde_json::Value>> {
        let Some(caption) = self.resolve_caption(&ctx) else {
            info!("No caption for this run, skipping");
            return Ok(None);
        };

        let info = self.tools.image_info(artifact).await?;
        let caption = Self::smart_wrap(&caption, info.width);
        let args = self.still_args(artifact, &caption, info.width);

        self.tools.convert(&args).await?;
        Ok(Some(serde_json::json!([caption])))
    }
}

/// Split a caption into two lines of roughly equal length.
///
/// Captions of one or two words are returned unchanged.
pub fn wrap_caption(full_caption: &str) -> String {
    let caption = full_caption.replace('\n', " ");
    let words: Vec<&str> = caption.split(' ').collect();
    if words.len() <= 2 {
        return full_caption.to_string();
    }

    let half = caption.chars().count() as f64 / 2.0;
    let mut consumed = 0usize;
    let mut first_line_words = 0usize;
    for word in &words {
        if consumed as f64 > half {
            break;
        }
        consumed += word.chars().count() + 1;
        first_line_words += 1;
    }

    if first_line_words >= words.len() {
        return caption;
    }

    format!(
        "{}\n{}",
        words[..first_line_words].join(" ").trim(),
        words[first_line_words..].join(" ").trim()
    )
}

/// Whether most letters of `text` are uppercase.
pub fn is_uppercasy(text: &str) -> bool {
    let (upper, letters) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(upper, letters), c| {
            (upper + usize::from(c.is_uppercase()), letters + 1)
        });
    letters > 0 && upper * 2 > letters
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escape text for a `caption:` argument: `%` and `\` are escapes to
/// ImageMagick and a leading `@` would read a file.
fn escape_caption(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('%', "%%");
    match escaped.strip_prefix('@') {
        Some(rest) => format!("\\@{rest}"),
        None => escaped,
    }
}
