//! Sequential reducer pipeline over a candidate file set.
//!
//! Each reducer sees the output of the previous one. Files a stage drops are
//! deleted before the next stage runs, so if the batch stops part way the
//! files left on disk are exactly the survivors of the last finished stage.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use itertools::Itertools;
use tracing::info;

use super::reducer::Reducer;
use crate::Result;

/// What one reducer stage did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub reducer: String,
    pub kept: usize,
    pub deleted: Vec<PathBuf>,
}

/// Outcome of a finished batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Files that survived every reducer.
    pub files: Vec<PathBuf>,
    pub stages: Vec<StageReport>,
}

impl BatchOutcome {
    pub fn deleted(&self) -> impl Iterator<Item = &PathBuf> {
        self.stages.iter().flat_map(|s| s.deleted.iter())
    }
}

/// An ordered list of reducers.
#[derive(Default, Clone)]
pub struct BatchPipeline {
    reducers: Vec<Arc<dyn Reducer>>,
}

impl BatchPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reducer to the end of the pipeline.
    ///
    /// Returns self for method chaining.
    pub fn add_reducer<R: Reducer + 'static>(mut self, reducer: R) -> Self {
        self.reducers.push(Arc::new(reducer));
        self
    }

    pub fn push(&mut self, reducer: Arc<dyn Reducer>) {
        self.reducers.push(reducer);
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }

    pub fn reducer_names(&self) -> Vec<&str> {
        self.reducers.iter().map(|r| r.name()).collect()
    }

    /// Run every reducer over `files`, deleting what each stage drops.
    ///
    /// A reducer error, including a broken output contract, stops the batch
    /// immediately; no later reducer runs.
    pub async fn run(&self, files: Vec<PathBuf>) -> Result<BatchOutcome> {
        let mut original_files = files.clone();
        let mut current_files = files;
        let mut stages = Vec::with_capacity(self.reducers.len());

        for reducer in &self.reducers {
            info!(reducer = %reducer.name(), files = current_files.len(), "Running reducer");

            let new_files = reducer.reduce(current_files).await?;
            let deleted = delete_reduced(&original_files, &new_files).await?;

            info!(
                reducer = %reducer.name(),
                kept = new_files.len(),
                deleted = deleted.len(),
                "Reducer finished"
            );
            stages.push(StageReport {
                reducer: reducer.name().to_string(),
                kept: new_files.len(),
                deleted,
            });

            original_files = new_files.clone();
            current_files = new_files;
        }

        Ok(BatchOutcome {
            files: current_files,
            stages,
        })
    }
}

/// Delete every file of `original_files` that `new_files` no longer lists.
async fn delete_reduced(original_files: &[PathBuf], new_files: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let keep: HashSet<&PathBuf> = new_files.iter().collect();
    let dropped: Vec<PathBuf> = original_files
        .iter()
        .filter(|original| !keep.contains(original))
        .unique()
        .cloned()
        .collect();

    for file in &dropped {
        info!(file = %file.display(), "Deleting");
        tokio::fs::remove_file(file).await?;
    }

    Ok(dropped)
}
