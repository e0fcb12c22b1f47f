//! Validator backed by an external program.
//!
//! Exit status 0 passes, any other status fails. This is how detectors the
//! pipeline knows nothing about (faces, similarity to reference images) plug
//! in.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::pipeline::Validator;

/// Configuration for a command validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandValidatorConfig {
    pub name: String,
    /// Shell command; `{input}` is replaced with the quoted artifact path.
    pub command: String,
}

#[derive(Debug, Clone)]
pub struct CommandValidator {
    config: CommandValidatorConfig,
}

impl CommandValidator {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self::from_config(CommandValidatorConfig {
            name: name.into(),
            command: command.into(),
        })
    }

    pub fn from_config(config: CommandValidatorConfig) -> Self {
        Self { config }
    }

    /// Substitute the artifact path into the command.
    fn substitute_variables(command: &str, artifact: &Path) -> String {
        command.replace("{input}", &shell_quote(&artifact.to_string_lossy()))
    }
}

/// Quote `value` as a single shell word.
fn shell_quote(value: &str) -> String {
    #[cfg(windows)]
    {
        format!("\"{}\"", value.replace('"', "\\\""))
    }

    #[cfg(not(windows))]
    {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

#[async_trait]
impl Validator for CommandValidator {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn validate(&self, artifact: &Path) -> Result<bool> {
        let command = Self::substitute_variables(&self.config.command, artifact);
        let output = process_utils::run(&mut process_utils::shell_command(&command)).await?;
        debug!(
            validator = %self.config.name,
            code = ?output.status.code(),
            "Validator command finished"
        );
        Ok(output.success())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_variable_substitution() {
        let command = CommandValidator::substitute_variables(
            "detect-faces --min 1 {input}",
            Path::new("/stills/It's @ 3s.png"),
        );
        assert_eq!(command, r"detect-faces --min 1 '/stills/It'\''s @ 3s.png'");
    }

    #[tokio::test]
    async fn test_exit_status_decides() {
        let path = Path::new("/tmp/any file.png");
        let pass = CommandValidator::new("pass", "test -n {input}");
        let fail = CommandValidator::new("fail", "test -z {input}");

        assert!(pass.validate(path).await.unwrap());
        assert!(!fail.validate(path).await.unwrap());
        assert_eq!(pass.name(), "pass");
    }
}
