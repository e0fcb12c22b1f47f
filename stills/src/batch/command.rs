//! Reducer backed by an external program.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::reducer::{Reducer, parse_reducer_output};
use crate::{Error, Result};

/// Configuration for an external reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReducerConfig {
    pub name: String,
    /// Shell command. Receives the candidates as a JSON array on stdin and
    /// must print the kept ones as a JSON array on stdout.
    pub command: String,
}

/// Runs a shell command as a reducer.
#[derive(Debug, Clone)]
pub struct CommandReducer {
    config: CommandReducerConfig,
}

impl CommandReducer {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::from_config(CommandReducerConfig {
            name: name.into(),
            command: command.into(),
        })
    }

    pub fn from_config(config: CommandReducerConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Reducer for CommandReducer {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn reduce(&self, files: Vec<PathBuf>) -> Result<Vec<PathBuf>> {
        let payload = serde_json::to_vec(&files)?;
        info!(reducer = %self.config.name, command = %self.config.command, "Running external reducer");

        let mut command = process_utils::shell_command(&self.config.command);
        let output = process_utils::run_with_stdin(&mut command, &payload).await?;

        if !output.success() {
            return Err(Error::Command(process_utils::CommandError::Failed {
                program: self.config.command.clone(),
                code: output.status.code().unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            }));
        }

        parse_reducer_output(&self.config.name, &output.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_command() {
        let reducer = CommandReducer::new("cat", "cat");
        let files = vec![PathBuf::from("/a.png"), PathBuf::from("/b.png")];
        assert_eq!(reducer.reduce(files.clone()).await.unwrap(), files);
    }

    #[tokio::test]
    async fn test_passthrough_large_candidate_list() {
        let files: Vec<PathBuf> = (0..8000)
            .map(|i| PathBuf::from(format!("/stills/Some Long Movie Title @ {i}s.png")))
            .collect();
        let reducer = CommandReducer::new("cat", "cat");

        let kept = tokio::time::timeout(
            std::time::Duration::from_secs(20),
            reducer.reduce(files.clone()),
        )
        .await
        .expect("reducer should finish on a large candidate list")
        .unwrap();
        assert_eq!(kept, files);
    }

    #[tokio::test]
    async fn test_non_array_output_is_contract_violation() {
        let reducer = CommandReducer::new("count", "echo 2");
        let err = reducer
            .reduce(vec![PathBuf::from("/a.png")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidReducerOutput { .. }));
    }

    #[tokio::test]
    async fn test_failing_command() {
        let reducer = CommandReducer::new("fails", "exit 4");
        let err = reducer.reduce(Vec::new()).await.unwrap_err();
        assert!(matches!(err, Error::Command(_)));
    }
}
