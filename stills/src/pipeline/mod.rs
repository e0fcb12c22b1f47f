//! Pipeline orchestration engine.
//!
//! A run picks an input from a [`Source`], generates an artifact with a
//! [`ContentGenerator`] until the [`Validator`]s accept it, applies
//! [`Filter`]s in place and publishes to [`Destination`]s. Runs can be chained
//! so later steps see earlier results, and the artifacts they leave behind are
//! removed with [`delete_stills`].

mod chain;
mod cleanup;
mod config;
mod generation;
mod result;
mod runner;
mod traits;
mod validation;

#[cfg(test)]
pub(crate) mod test_utils;

pub use chain::{ChainStep, generate_chain};
pub use cleanup::delete_stills;
pub use config::{PostTextFn, RunConfig};
pub use generation::{Generated, MAX_GENERATION_ATTEMPTS, generate_validated};
pub use result::{GenerationReport, PublishResponse, RunResult, SourceResult};
pub use runner::generate;
pub use traits::{
    ContentGenerator, Destination, Filter, FilterContext, PublishOptions, Source, Validator,
};
pub use validation::validate;
