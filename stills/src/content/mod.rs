//! Content generators.

mod still;

pub use still::{StillConfig, StillGenerator};
