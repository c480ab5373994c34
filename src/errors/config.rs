// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors found while validating a pipeline configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A modulator names a formatter type that does not exist
    UnknownFormatter {
        /// Position of the modulator, including nesting (e.g. `2.left.0`)
        location: String,
        /// The unknown type name
        formatter: String,
    },
    /// Two modulators share the same id
    DuplicateModulatorId {
        /// The duplicate modulator ID
        modulator_id: String,
    },
    /// An executor option is out of range
    InvalidExecutorOption {
        option: String,
        reason: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnknownFormatter {
                location,
                formatter,
            } => {
                write!(
                    f,
                    "Modulator at {} uses unknown formatter type '{}'",
                    location, formatter
                )
            }
            ValidationError::DuplicateModulatorId { modulator_id } => {
                write!(f, "Duplicate modulator ID: '{}'", modulator_id)
            }
            ValidationError::InvalidExecutorOption { option, reason } => {
                write!(f, "Invalid executor option '{}': {}", option, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a configuration or building formatters from it.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unknown formatter type: '{0}'")]
    UnknownFormatter(String),

    #[error("Invalid options for formatter '{formatter}': {reason}")]
    InvalidOptions { formatter: String, reason: String },

    #[error("Invalid directive '{directive}': {reason}")]
    InvalidDirective { directive: String, reason: String },

    #[error("Invalid regular expression: {0}")]
    Regex(#[from] regex::Error),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

impl ConfigError {
    pub fn invalid_options(formatter: &str, reason: impl fmt::Display) -> Self {
        ConfigError::InvalidOptions {
            formatter: formatter.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_directive(directive: &str, reason: impl fmt::Display) -> Self {
        ConfigError::InvalidDirective {
            directive: directive.to_string(),
            reason: reason.to_string(),
        }
    }
}
