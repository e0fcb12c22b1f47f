//! Library-wide error types.

use thiserror::Error;

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Library-wide error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO error while {op} {}: {source}", .path.display())]
    IoPath {
        op: &'static str,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Command error: {0}")]
    Command(#[from] process_utils::CommandError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Generator error: {0}")]
    Generator(String),

    #[error("Filter {filter} failed: {message}")]
    Filter { filter: String, message: String },

    #[error("Destination {destination} failed: {message}")]
    Destination {
        destination: String,
        message: String,
    },

    #[error("Validator {validator} failed: {message}")]
    Validator { validator: String, message: String },

    #[error("Reducer {reducer} must return a list of files, got: {found}")]
    InvalidReducerOutput { reducer: String, found: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn source_failed(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    pub fn generator(msg: impl Into<String>) -> Self {
        Self::Generator(msg.into())
    }

    pub fn filter(filter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Filter {
            filter: filter.into(),
            message: message.into(),
        }
    }

    pub fn destination(destination: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Destination {
            destination: destination.into(),
            message: message.into(),
        }
    }

    pub fn validator(validator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validator {
            validator: validator.into(),
            message: message.into(),
        }
    }

    pub fn io_path(
        op: &'static str,
        path: impl Into<std::path::PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::IoPath {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error comes from misconfiguration rather than a failing capability.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::InvalidReducerOutput { .. } | Self::Pattern(_)
        )
    }
}
