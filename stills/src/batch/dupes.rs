//! Drops candidates that have already been published.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::reducer::Reducer;
use crate::Result;

/// Drops files whose basename is in a set of already-published names.
#[derive(Debug, Clone, Default)]
pub struct DupesReducer {
    existing: HashSet<String>,
}

impl DupesReducer {
    pub fn new<I, S>(existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            existing: existing.into_iter().map(Into::into).collect(),
        }
    }

    fn is_dupe(&self, file: &Path) -> bool {
        file.file_name()
            .map(|name| self.existing.contains(name.to_string_lossy().as_ref()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl Reducer for DupesReducer {
    fn name(&self) -> &str {
        "dupes"
    }

    async fn reduce(&self, files: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
        Ok(files
            .into_iter()
            .filter(|file| {
                let dupe = self.is_dupe(file);
                if dupe {
                    debug!(file = %file.display(), "Already published");
                }
                !dupe
            })
            .collect())
    }
}

/// File names in a directory of published artifacts.
///
/// A missing directory means nothing has been published yet.
pub async fn published_names(dir: &Path) -> Result<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
