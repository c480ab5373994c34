// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for human-readable output and
//! [`StructuredLog`] to emit the same event with its fields attached as
//! tracing key/value pairs.
//!
//! # Organization
//!
//! * `formatter` - Formatter application and failures
//! * `engine` - Executor lifecycle and message routing
//! * `config` - Configuration loading and validation
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_modulator::observability::messages::engine::ExecutionStarted;
//! use the_modulator::observability::messages::StructuredLog;
//!
//! let msg = ExecutionStarted {
//!     strategy: "concurrent",
//!     message_count: 128,
//!     max_concurrency: 4,
//! };
//!
//! let span = msg.span("batch");
//! let _guard = span.enter();
//! msg.log();
//! ```

pub mod config;
pub mod engine;
pub mod formatter;

use tracing::Span;

/// A log event that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the event at its documented level.
    fn log(&self);

    /// Create a span carrying the event's fields.
    fn span(&self, name: &str) -> Span;
}
