//! Reducer trait for the batch pipeline.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::{Error, Result};

/// Prunes a candidate file set.
///
/// A reducer returns the files to keep. Files it drops are deleted from disk
/// by the [`BatchPipeline`](super::BatchPipeline), not by the reducer.
#[async_trait]
pub trait Reducer: Send + Sync {
    fn name(&self) -> &str;

    async fn reduce(&self, files: Vec<PathBuf>) -> Result<Vec<PathBuf>>;
}

/// Interpret the raw output of an external reducer.
///
/// The output must be a JSON array of paths; anything else breaks the reducer
/// contract and is reported as [`Error::InvalidReducerOutput`].
pub fn parse_reducer_output(reducer: &str, raw: &str) -> Result<Vec<PathBuf>> {
    let invalid = |found: String| Error::InvalidReducerOutput {
        reducer: reducer.to_string(),
        found,
    };

    let value: serde_json::Value =
        serde_json::from_str(raw.trim()).map_err(|e| invalid(format!("unparseable output ({e})")))?;

    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(path) => Ok(PathBuf::from(path)),
                other => Err(invalid(format!("non-string entry {other}"))),
            })
            .collect(),
        other => Err(invalid(describe_json(&other))),
    }
}

fn describe_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null".to_string(),
        serde_json::Value::Bool(_) => format!("a boolean ({value})"),
        serde_json::Value::Number(_) => format!("a number ({value})"),
        serde_json::Value::String(_) => format!("a single string ({value})"),
        serde_json::Value::Object(_) => "an object".to_string(),
        serde_json::Value::Array(_) => "an array".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_array() {
        let files = parse_reducer_output("faces", r#"["a.png", "b.png"]"#).unwrap();
        assert_eq!(files, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse_reducer_output("faces", "[]\n").unwrap().is_empty());
    }

    #[rstest]
    #[case::single_item(r#""a.png""#, "a single string")]
    #[case::object(r#"{"files": []}"#, "an object")]
    #[case::null("null", "null")]
    #[case::nothing("", "unparseable")]
    #[case::mixed(r#"["a.png", 3]"#, "non-string entry")]
    fn test_parse_rejects_non_sequences(#[case] raw: &str, #[case] expected: &str) {
        let err = parse_reducer_output("faces", raw).unwrap_err();
        match &err {
            Error::InvalidReducerOutput { reducer, found } => {
                assert_eq!(reducer, "faces");
                assert!(found.contains(expected), "{found}");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.is_configuration());
    }
}
