//! Sources that pick the video a run works from.

mod local;
mod url_list;

pub use local::{DEFAULT_VIDEO_PATTERN, LocalSource};
pub use url_list::{UrlListSource, output_name_from_url};

use rand::RngExt;

/// Pick a random element of `items`.
pub(crate) fn pick<T>(items: &[T]) -> Option<&T> {
    if items.is_empty() {
        return None;
    }
    items.get(rand::rng().random_range(0..items.len()))
}
