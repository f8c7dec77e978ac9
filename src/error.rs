//! Error types for the application scaffolding
//!
//! Every failure raised while building, parsing or running an application ends
//! up as an [`AppError`]. Callback failures are carried through unchanged so the
//! user sees their own message.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the scaffolding layer
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed builder usage, such as colliding flag names
    #[error("Build error: {message}")]
    Build { message: String },

    /// Errors reported by the argument parser
    #[error("{}", parse_message(.0))]
    Parse(#[from] clap::Error),

    /// Positional arguments rejected by a validator
    #[error("{message}")]
    Args { message: String },

    /// Failure to read a parsed flag into the configuration store
    #[error("Flag binding error: {message}")]
    Bind {
        message: String,
        #[source]
        source: Option<clap::parser::MatchesError>,
    },

    /// Failure to load or deserialize configuration
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<figment::Error>>,
    },

    /// The options object failed to derive its computed fields
    #[error(transparent)]
    Complete(anyhow::Error),

    /// The options object reported one or more validation errors
    #[error("{}", join_errors(.errors))]
    Validation { errors: Vec<anyhow::Error> },

    /// A run callback returned an error
    #[error(transparent)]
    Callback(anyhow::Error),

    /// Writing help or usage output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Create a new build error
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    /// Create a new positional argument error
    pub fn args(message: impl Into<String>) -> Self {
        Self::Args {
            message: message.into(),
        }
    }

    /// Create a new flag binding error
    pub fn bind(message: impl Into<String>, source: clap::parser::MatchesError) -> Self {
        Self::Bind {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
            source: None,
        }
    }

    /// Create a configuration error for a specific file
    pub fn config_file<P: Into<PathBuf>>(message: impl Into<String>, path: P) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path.into()),
            source: None,
        }
    }

    /// Wrap a deserialization failure from the configuration store
    pub fn unmarshal(source: figment::Error) -> Self {
        Self::Config {
            message: source.to_string(),
            path: None,
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error from the collected errors
    pub fn validation(errors: Vec<anyhow::Error>) -> Self {
        Self::Validation { errors }
    }
}

/// clap renders `error: <message>` followed by usage and tips; keep only the message
fn parse_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).trim().to_string()
}

fn join_errors(errors: &[anyhow::Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_error_is_transparent() {
        let err = AppError::Callback(anyhow::anyhow!("boom"));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = AppError::validation(vec![
            anyhow::anyhow!("port must be positive"),
            anyhow::anyhow!("host is required"),
        ]);
        assert_eq!(err.to_string(), "port must be positive; host is required");
    }

    #[test]
    fn test_parse_error_keeps_only_message() {
        let err = clap::Command::new("demo")
            .try_get_matches_from(["demo", "--nope"])
            .unwrap_err();
        let err = AppError::from(err);
        let message = err.to_string();
        assert!(message.contains("--nope"));
        assert!(!message.starts_with("error:"));
        assert!(!message.contains('\n'));
    }
}
