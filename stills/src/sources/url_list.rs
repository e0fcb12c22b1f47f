//! Random video from a list of URLs.

use std::path::Path;

use async_trait::async_trait;
use regex::Regex;

use super::pick;
use crate::pipeline::{Source, SourceResult};
use crate::{Error, Result};

/// Picks a random URL, optionally restricted to those matching a regex.
///
/// The output name is the percent-decoded file stem of the URL path, so
/// `https://cdn/videos/The%20Film.mp4?sig=x` becomes `The Film`.
#[derive(Debug, Clone)]
pub struct UrlListSource {
    urls: Vec<String>,
    filter: Option<Regex>,
}

impl UrlListSource {
    pub fn new(urls: Vec<String>) -> Self {
        Self { urls, filter: None }
    }

    pub fn with_filter(mut self, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::config(format!("invalid url filter {pattern:?}: {e}")))?;
        self.filter = Some(regex);
        Ok(self)
    }
}

/// Human-readable name of the file a URL points at.
pub fn output_name_from_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::source_failed(format!("invalid url {raw:?}: {e}")))?;
    let decoded = urlencoding::decode(parsed.path())
        .map_err(|e| Error::source_failed(format!("undecodable url path {raw:?}: {e}")))?;

    Path::new(decoded.as_ref())
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| Error::source_failed(format!("url has no file name: {raw}")))
}

#[async_trait]
impl Source for UrlListSource {
    fn name(&self) -> &str {
        "urls"
    }

    async fn get(&self) -> Result<SourceResult> {
        let candidates: Vec<&String> = self
            .urls
            .iter()
            .filter(|u| self.filter.as_ref().is_none_or(|f| f.is_match(u)))
            .collect();

        let input = pick(&candidates)
            .ok_or_else(|| Error::source_failed("no urls left after filtering"))?;
        let output = output_name_from_url(input)?;

        Ok(SourceResult::new(input.as_str(), output))
    }
}
