//! Stills: pull a frame from a video, check it, dress it up and publish it.
//!
//! [`pipeline`] holds the engine. The other modules hold the concrete
//! sources, generators, validators, filters and destinations it is usually
//! wired with, plus [`batch`] for generating many stills and narrowing them
//! down with reducers.

pub mod batch;
pub mod config;
pub mod content;
pub mod destinations;
pub mod error;
pub mod filters;
pub mod media;
pub mod pipeline;
pub mod sources;
pub mod utils;
pub mod validators;

pub use error::{Error, Result};
