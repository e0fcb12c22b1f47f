//! Deletes the artifacts referenced by run results.

use std::path::PathBuf;

use itertools::Itertools;
use tracing::info;

use super::result::RunResult;
use crate::Result;

/// Delete the `content` artifact of every result, each path once.
///
/// Takes any sequence of results; chain output is passed as
/// `results.iter().flatten()`. Missing files are an error: results must be
/// cleaned up exactly once. Returns the deleted paths.
pub async fn delete_stills<'a>(
    results: impl IntoIterator<Item = &'a RunResult>,
) -> Result<Vec<PathBuf>> {
    let files: Vec<PathBuf> = results
        .into_iter()
        .filter_map(|result| result.content.clone())
        .unique()
        .collect();

    for file in &files {
        info!(file = %file.display(), "Deleting still");
        tokio::fs::remove_file(file).await?;
    }

    Ok(files)
}
