//! Archive destination: copies stills into a local directory.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::pipeline::{Destination, PublishOptions, PublishResponse};
use crate::utils::fs::copy_file;
use crate::{Error, Result};

fn default_name() -> String {
    "directory".to_string()
}

fn default_sidecar() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub dir: PathBuf,
    /// Write `<file>.json` with the tags and text next to the copy.
    #[serde(default = "default_sidecar")]
    pub sidecar: bool,
}

impl DirectoryConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            name: default_name(),
            dir: dir.into(),
            sidecar: default_sidecar(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Sidecar<'a> {
    file: &'a str,
    tags: &'a [String],
    text: Option<&'a str>,
}

pub struct DirectoryDestination {
    config: DirectoryConfig,
}

impl DirectoryDestination {
    pub fn new(config: DirectoryConfig) -> Self {
        Self { config }
    }

    fn sidecar_path(target: &Path) -> PathBuf {
        let mut name = target.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    }

    fn file_url(target: &Path) -> String {
        let absolute = std::path::absolute(target).unwrap_or_else(|_| target.to_path_buf());
        url::Url::from_file_path(&absolute)
            .map(String::from)
            .unwrap_or_else(|()| absolute.display().to_string())
    }
}

#[async_trait]
impl Destination for DirectoryDestination {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn publish(
        &self,
        artifact: &Path,
        options: &PublishOptions,
    ) -> Result<Option<PublishResponse>> {
        let file_name = artifact.file_name().ok_or_else(|| {
            Error::destination(
                &self.config.name,
                format!("{} has no file name", artifact.display()),
            )
        })?;
        let target = self.config.dir.join(file_name);

        let bytes = copy_file(artifact, &target).await?;
        info!(target = %target.display(), bytes, "Archived still");

        if self.config.sidecar {
            let file_name = file_name.to_string_lossy();
            let sidecar = Sidecar {
                file: &file_name,
                tags: &options.tags,
                text: options.text.as_deref(),
            };
            let path = Self::sidecar_path(&target);
            tokio::fs::write(&path, serde_json::to_vec_pretty(&sidecar)?)
                .await
                .map_err(|e| Error::io_path("writing", &path, e))?;
            debug!(sidecar = %path.display(), "Wrote sidecar");
        }

        Ok(Some(PublishResponse::with_url(Self::file_url(&target))))
    }
}
