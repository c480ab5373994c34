// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for configuration loading and validation.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A configuration file was loaded.
///
/// # Log Level
/// `info!`
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub strategy: &'a str,
    pub modulator_count: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded config '{}': strategy={}, {} modulators",
            self.path, self.strategy, self.modulator_count
        )
    }
}

impl StructuredLog for ConfigLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = self.path,
            strategy = self.strategy,
            modulator_count = self.modulator_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("config", span_name = name, path = self.path)
    }
}

/// The configured pipeline has no modulators and will pass messages through.
///
/// # Log Level
/// `warn!`
pub struct EmptyPipeline;

impl Display for EmptyPipeline {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "No modulators configured; messages pass through unchanged")
    }
}

impl StructuredLog for EmptyPipeline {
    fn log(&self) {
        tracing::warn!("{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("config", span_name = name)
    }
}

/// Validation rejected a configuration.
///
/// # Log Level
/// `error!`
pub struct ValidationFailed<'a> {
    pub errors: &'a [String],
}

impl Display for ValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Configuration validation failed with {} errors: {}",
            self.errors.len(),
            self.errors.join("; ")
        )
    }
}

impl StructuredLog for ValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(error_count = self.errors.len(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("config", span_name = name, error_count = self.errors.len())
    }
}
