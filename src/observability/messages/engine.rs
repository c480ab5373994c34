// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for executor lifecycle and message routing events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A batch of messages entered an executor.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_modulator::observability::messages::engine::ExecutionStarted;
///
/// let msg = ExecutionStarted {
///     strategy: "sequential",
///     message_count: 10,
///     max_concurrency: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ExecutionStarted<'a> {
    pub strategy: &'a str,
    pub message_count: usize,
    pub max_concurrency: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} execution: {} messages, max_concurrency={}",
            self.strategy, self.message_count, self.max_concurrency
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            message_count = self.message_count,
            max_concurrency = self.max_concurrency,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            strategy = self.strategy,
            message_count = self.message_count,
            max_concurrency = self.max_concurrency,
        )
    }
}

/// A batch finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted<'a> {
    pub strategy: &'a str,
    pub delivered: usize,
    pub fallback: usize,
    pub discarded: usize,
    pub duration: std::time::Duration,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} execution completed in {:?}: delivered={}, fallback={}, discarded={}",
            self.strategy, self.duration, self.delivered, self.fallback, self.discarded
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            delivered = self.delivered,
            fallback = self.fallback,
            discarded = self.discarded,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("execution", span_name = name, strategy = self.strategy)
    }
}

/// The pipeline dropped a message.
///
/// # Log Level
/// `debug!`
pub struct MessageDiscarded<'a> {
    pub sequence: u64,
    pub stream: &'a str,
}

impl Display for MessageDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Message {} on stream '{}' discarded", self.sequence, self.stream)
    }
}

impl StructuredLog for MessageDiscarded<'_> {
    fn log(&self) {
        tracing::debug!(sequence = self.sequence, stream = self.stream, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("message", span_name = name, sequence = self.sequence)
    }
}

/// The pipeline asked for a message to be routed to the fallback stream.
///
/// # Log Level
/// `debug!`
pub struct MessageRoutedToFallback<'a> {
    pub sequence: u64,
    pub from_stream: &'a str,
    pub fallback_stream: &'a str,
}

impl Display for MessageRoutedToFallback<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Message {} routed from '{}' to fallback stream '{}'",
            self.sequence, self.from_stream, self.fallback_stream
        )
    }
}

impl StructuredLog for MessageRoutedToFallback<'_> {
    fn log(&self) {
        tracing::debug!(
            sequence = self.sequence,
            from_stream = self.from_stream,
            fallback_stream = self.fallback_stream,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("message", span_name = name, sequence = self.sequence)
    }
}
