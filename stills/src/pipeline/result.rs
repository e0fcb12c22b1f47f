//! Records produced by a pipeline run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The input picked by a [`Source`](super::Source).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    /// Addressable input handle (path or URL).
    pub input: String,
    /// Human-meaningful name, used as a tag and for artifact naming.
    pub output: String,
    /// Extra data a source wants to pass downstream.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl SourceResult {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// How the artifact of a run came to be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Number of generator calls made.
    pub attempts: u32,
    /// False when the validators were given up on and the last artifact was
    /// accepted unchecked.
    pub validated: bool,
}

/// Response from a destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PublishResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PublishResponse {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            extra: serde_json::Map::new(),
        }
    }

    /// Build a response from an arbitrary JSON body, lifting a string `url` field.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(mut map) => {
                let url = match map.remove("url") {
                    Some(serde_json::Value::String(url)) => Some(url),
                    Some(other) => {
                        map.insert("url".to_string(), other);
                        None
                    }
                    None => None,
                };
                Self { url, extra: map }
            }
            other => {
                let mut extra = serde_json::Map::new();
                extra.insert("body".to_string(), other);
                Self { url: None, extra }
            }
        }
    }

    /// Short human-readable form for logs.
    pub fn describe(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => serde_json::Value::Object(self.extra.clone()).to_string(),
        }
    }
}

/// Everything produced by one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub source: Option<SourceResult>,
    /// The artifact the run operated on.
    pub content: Option<PathBuf>,
    /// Tags handed to destinations.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Absent when an image was supplied up front.
    pub generation: Option<GenerationReport>,
    #[serde(default)]
    pub filters: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub destinations: BTreeMap<String, PublishResponse>,
}

impl RunResult {
    /// Whether the artifact went through the validators successfully.
    ///
    /// Runs on a pre-supplied image count as validated.
    pub fn is_validated(&self) -> bool {
        self.generation.is_none_or(|g| g.validated)
    }
}
