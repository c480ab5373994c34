// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for formatter events.
//!
//! This module contains message types for logging events related to:
//! * Formatter application (debug level, one event per message and step)
//! * Formatter failures that cause a message to be discarded
//! * Content the formatter could not fully interpret but passed through

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A formatter transformed a message.
///
/// # Log Level
/// `debug!` - Emitted once per message per pipeline step
pub struct FormatterApplied<'a> {
    pub modulator_id: &'a str,
    pub formatter: &'a str,
    pub input_size: usize,
    pub output_size: usize,
}

impl Display for FormatterApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Formatter '{}' ({}) applied: input={} bytes, output={} bytes",
            self.modulator_id, self.formatter, self.input_size, self.output_size
        )
    }
}

impl StructuredLog for FormatterApplied<'_> {
    fn log(&self) {
        tracing::debug!(
            modulator_id = self.modulator_id,
            formatter = self.formatter,
            input_size = self.input_size,
            output_size = self.output_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "formatter",
            span_name = name,
            modulator_id = self.modulator_id,
            formatter = self.formatter,
        )
    }
}

/// A formatter returned an error; the message will be discarded.
///
/// # Log Level
/// `warn!` - The pipeline keeps running but the message is lost
///
/// # Example
/// ```
/// use the_modulator::observability::messages::formatter::FormatterFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad base64");
/// let msg = FormatterFailed {
///     modulator_id: "decode",
///     formatter: "base64_decode",
///     error: &error,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct FormatterFailed<'a> {
    pub modulator_id: &'a str,
    pub formatter: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for FormatterFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Formatter '{}' ({}) failed: {}",
            self.modulator_id, self.formatter, self.error
        )
    }
}

impl StructuredLog for FormatterFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            modulator_id = self.modulator_id,
            formatter = self.formatter,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "formatter",
            span_name = name,
            modulator_id = self.modulator_id,
            formatter = self.formatter,
        )
    }
}

/// A metadata value could not be rendered by the formatter and was left empty.
///
/// # Log Level
/// `warn!`
pub struct UnsupportedValue<'a> {
    pub formatter: &'a str,
    pub key: &'a str,
    pub reason: &'a str,
}

impl Display for UnsupportedValue<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Formatter '{}' cannot use value of key '{}': {}",
            self.formatter, self.key, self.reason
        )
    }
}

impl StructuredLog for UnsupportedValue<'_> {
    fn log(&self) {
        tracing::warn!(
            formatter = self.formatter,
            key = self.key,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("formatter", span_name = name, formatter = self.formatter, key = self.key)
    }
}

/// Content could not be parsed and was passed through unchanged.
///
/// # Log Level
/// `warn!`
pub struct ContentPassedThrough<'a> {
    pub formatter: &'a str,
    pub reason: &'a str,
}

impl Display for ContentPassedThrough<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Formatter '{}' left content unchanged: {}",
            self.formatter, self.reason
        )
    }
}

impl StructuredLog for ContentPassedThrough<'_> {
    fn log(&self) {
        tracing::warn!(formatter = self.formatter, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("formatter", span_name = name, formatter = self.formatter)
    }
}

/// A timestamp could not be parsed.
///
/// # Log Level
/// `warn!`
pub struct TimestampParseFailed<'a> {
    pub formatter: &'a str,
    pub value: &'a str,
    pub reason: &'a str,
}

impl Display for TimestampParseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Formatter '{}' failed to parse timestamp '{}': {}",
            self.formatter, self.value, self.reason
        )
    }
}

impl StructuredLog for TimestampParseFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            formatter = self.formatter,
            value = self.value,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("formatter", span_name = name, formatter = self.formatter)
    }
}
