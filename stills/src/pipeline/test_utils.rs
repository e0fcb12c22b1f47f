//! Test doubles for the capability traits.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::result::{PublishResponse, SourceResult};
use super::traits::{
    ContentGenerator, Destination, Filter, FilterContext, PublishOptions, Source, Validator,
};
use crate::Result;

/// Initialize tracing for tests.
#[inline]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Shared, ordered log of capability calls.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub struct StaticSource {
    pub result: SourceResult,
    pub calls: Mutex<u32>,
}

impl StaticSource {
    pub fn new(input: &str, output: &str) -> Arc<Self> {
        Arc::new(Self {
            result: SourceResult::new(input, output),
            calls: Mutex::new(0),
        })
    }
}

#[async_trait]
impl Source for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn get(&self) -> Result<SourceResult> {
        *self.calls.lock() += 1;
        Ok(self.result.clone())
    }
}

pub struct FailingSource;

#[async_trait]
impl Source for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    async fn get(&self) -> Result<SourceResult> {
        Err(crate::Error::source_failed("no videos found"))
    }
}

/// Writes `<output>-<n>.png` into `dir` on every call.
pub struct FileGenerator {
    pub dir: PathBuf,
    pub calls: Mutex<u32>,
}

impl FileGenerator {
    pub fn new(dir: &Path) -> Arc<Self> {
        Arc::new(Self {
            dir: dir.to_path_buf(),
            calls: Mutex::new(0),
        })
    }
}

#[async_trait]
impl ContentGenerator for FileGenerator {
    fn name(&self) -> &str {
        "file"
    }

    async fn generate(&self, _input: &str, output: &str) -> Result<PathBuf> {
        let n = {
            let mut calls = self.calls.lock();
            *calls += 1;
            *calls
        };
        let path = self.dir.join(format!("{output}-{n}.png"));
        tokio::fs::write(&path, b"").await?;
        Ok(path)
    }
}

pub struct FailingGenerator {
    pub calls: Mutex<u32>,
}

impl FailingGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(0),
        })
    }
}

#[async_trait]
impl ContentGenerator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _input: &str, _output: &str) -> Result<PathBuf> {
        *self.calls.lock() += 1;
        Err(crate::Error::generator("ffmpeg exited with status 1"))
    }
}

pub struct FixedValidator(pub bool);

#[async_trait]
impl Validator for FixedValidator {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn validate(&self, _artifact: &Path) -> Result<bool> {
        Ok(self.0)
    }
}

/// Appends its name to the artifact file and to the call log.
pub struct AppendFilter {
    pub name: String,
    pub log: CallLog,
    pub output: Option<serde_json::Value>,
}

impl AppendFilter {
    pub fn new(name: &str, log: &CallLog, output: Option<serde_json::Value>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            output,
        })
    }
}

#[async_trait]
impl Filter for AppendFilter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn apply(
        &self,
        artifact: &Path,
        _ctx: FilterContext<'_>,
    ) -> Result<Option<serde_json::Value>> {
        let mut contents = tokio::fs::read_to_string(artifact).await?;
        contents.push_str(&self.name);
        tokio::fs::write(artifact, contents).await?;
        self.log.lock().push(format!("filter:{}", self.name));
        Ok(self.output.clone())
    }
}

pub struct FailingFilter;

#[async_trait]
impl Filter for FailingFilter {
    fn name(&self) -> &str {
        "failing"
    }

    async fn apply(
        &self,
        _artifact: &Path,
        _ctx: FilterContext<'_>,
    ) -> Result<Option<serde_json::Value>> {
        Err(crate::Error::filter("failing", "convert not found"))
    }
}

/// Records what it was asked to publish, including the artifact contents.
pub struct RecordingDestination {
    pub name: String,
    pub log: CallLog,
    pub published: Mutex<Vec<(String, PublishOptions)>>,
    pub response: Option<PublishResponse>,
}

impl RecordingDestination {
    pub fn new(name: &str, log: &CallLog, response: Option<PublishResponse>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
            published: Mutex::new(Vec::new()),
            response,
        })
    }
}

#[async_trait]
impl Destination for RecordingDestination {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(
        &self,
        artifact: &Path,
        options: &PublishOptions,
    ) -> Result<Option<PublishResponse>> {
        let contents = tokio::fs::read_to_string(artifact).await?;
        self.published.lock().push((contents, options.clone()));
        self.log.lock().push(format!("destination:{}", self.name));
        Ok(self.response.clone())
    }
}

/// Logs the attempt, then fails.
pub struct FailingDestination {
    pub name: String,
    pub log: CallLog,
}

impl FailingDestination {
    pub fn new(name: &str, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: log.clone(),
        })
    }
}

#[async_trait]
impl Destination for FailingDestination {
    fn name(&self) -> &str {
        &self.name
    }

    async fn publish(
        &self,
        _artifact: &Path,
        _options: &PublishOptions,
    ) -> Result<Option<PublishResponse>> {
        self.log.lock().push(format!("destination:{}", self.name));
        Err(crate::Error::destination(&self.name, "401 - unauthorized"))
    }
}
