// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging in the modulator pipeline. Message types follow a struct-based pattern
//! with `Display` implementations, so log text lives in one place instead of being
//! scattered through formatters and executors as format strings.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::formatter` - Formatter application, failures and content warnings
//! * `messages::engine` - Executor batch lifecycle and per-message routing
//! * `messages::config` - Configuration loading and validation
//!
//! # Usage
//!
//! ```rust
//! use the_modulator::observability::messages::formatter::FormatterFailed;
//! use the_modulator::observability::messages::StructuredLog;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! FormatterFailed {
//!     modulator_id: "decode",
//!     formatter: "base64_decode",
//!     error: &error,
//! }
//! .log();
//! ```

pub mod messages;

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Install a global `fmt` subscriber writing to stderr.
///
/// The filter is taken from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
/// Calling this more than once is harmless; later calls leave the first subscriber
/// in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
