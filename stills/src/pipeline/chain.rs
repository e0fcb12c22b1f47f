//! Chain orchestrator: run configurations in order, letting later steps
//! depend on earlier results.

use std::future::Future;

use futures::future::BoxFuture;
use tracing::{debug, info};

use super::config::RunConfig;
use super::result::RunResult;
use super::runner::generate;
use crate::Result;

type DeferredFn = Box<
    dyn FnOnce(Option<RunResult>, Vec<Option<RunResult>>) -> BoxFuture<'static, Option<RunConfig>>
        + Send,
>;

/// One item of a chain.
pub enum ChainStep {
    /// A configuration known up front.
    Config(RunConfig),
    /// A configuration computed from the previous result and all results so
    /// far. Returning `None` skips the slot.
    Deferred(DeferredFn),
}

impl ChainStep {
    /// A step computed synchronously from earlier results.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce(Option<&RunResult>, &[Option<RunResult>]) -> Option<RunConfig> + Send + 'static,
    {
        Self::Deferred(Box::new(
            move |last: Option<RunResult>,
                  all: Vec<Option<RunResult>>|
                  -> BoxFuture<'static, Option<RunConfig>> {
                let config = f(last.as_ref(), &all);
                Box::pin(async move { config })
            },
        ))
    }

    /// A step computed asynchronously from earlier results.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Option<RunResult>, Vec<Option<RunResult>>) -> Fut + Send + 'static,
        Fut: Future<Output = Option<RunConfig>> + Send + 'static,
    {
        Self::Deferred(Box::new(
            move |last: Option<RunResult>,
                  all: Vec<Option<RunResult>>|
                  -> BoxFuture<'static, Option<RunConfig>> { Box::pin(f(last, all)) },
        ))
    }
}

impl From<RunConfig> for ChainStep {
    fn from(config: RunConfig) -> Self {
        Self::Config(config)
    }
}

/// Run `steps` strictly in order, one result slot per step.
///
/// Deferred steps are resolved right before they run, with the immediately
/// preceding slot (which may be `None`) and every slot so far. The first
/// failing run aborts the chain.
pub async fn generate_chain(
    steps: impl IntoIterator<Item = ChainStep>,
) -> Result<Vec<Option<RunResult>>> {
    let mut results: Vec<Option<RunResult>> = Vec::new();
    let mut last: Option<RunResult> = None;

    for (index, step) in steps.into_iter().enumerate() {
        let config = match step {
            ChainStep::Config(config) => Some(config),
            ChainStep::Deferred(f) => f(last.clone(), results.clone()).await,
        };

        last = match config {
            Some(config) => {
                debug!(step = index, "Running chain step");
                Some(generate(&config).await?)
            }
            None => {
                info!(step = index, "Chain step skipped");
                None
            }
        };
        results.push(last.clone());
    }

    Ok(results)
}
