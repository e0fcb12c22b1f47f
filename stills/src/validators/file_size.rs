//! Rejects artifacts below a minimum size.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::Result;
use crate::pipeline::Validator;
use crate::utils::fs::file_size;

/// Passes artifacts of at least `min_bytes`.
///
/// Black or blank frames compress to very small PNGs, so a size floor is a
/// cheap way to skip fades and title cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSizeValidator {
    min_bytes: u64,
}

impl FileSizeValidator {
    pub fn new(min_bytes: u64) -> Self {
        Self { min_bytes }
    }
}

#[async_trait]
impl Validator for FileSizeValidator {
    fn name(&self) -> &str {
        "file_size"
    }

    async fn validate(&self, artifact: &Path) -> Result<bool> {
        let size = file_size(artifact).await?;
        debug!(artifact = %artifact.display(), size, min = self.min_bytes, "Checked size");
        Ok(size >= self.min_bytes)
    }
}
