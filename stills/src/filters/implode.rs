use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use crate::Result;
use crate::media::MediaTools;
use crate::pipeline::{Filter, FilterContext};

pub const DEFAULT_IMPLODE_RATE: f64 = 0.6;

/// Pinches the center of the still.
pub struct ImplodeFilter {
    rate: f64,
    tools: MediaTools,
}

impl ImplodeFilter {
    pub fn new(rate: Option<f64>) -> Self {
        Self::with_tools(rate, MediaTools::from_env())
    }

    pub fn with_tools(rate: Option<f64>, tools: MediaTools) -> Self {
        Self {
            rate: rate.unwrap_or(DEFAULT_IMPLODE_RATE),
            tools,
        }
    }

    fn args(&self, file: &Path) -> Vec<String> {
        let file = file.to_string_lossy().into_owned();
        vec![
            file.clone(),
            "-implode".to_string(),
            self.rate.to_string(),
            file,
        ]
    }
}

#[async_trait]
impl Filter for ImplodeFilter {
    fn name(&self) -> &str {
        "implode"
    }

    async fn apply(
        &self,
        artifact: &Path,
        _ctx: FilterContext<'_>,
    ) -> Result<Option<serde_json::Value>> {
        info!(rate = self.rate, "Imploding");
        self.tools.convert(&self.args(artifact)).await?;
        Ok(None)
    }
}
