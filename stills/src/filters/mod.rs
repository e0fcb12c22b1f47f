//! ImageMagick filters applied to a still after generation.

mod captions;
mod implode;
mod overlay;

pub use captions::{CAPTION_METADATA_KEY, CaptionsConfig, CaptionsFilter, is_uppercasy, wrap_caption};
pub use implode::{DEFAULT_IMPLODE_RATE, ImplodeFilter};
pub use overlay::{OverlayConfig, OverlayFilter};
