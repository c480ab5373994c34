// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while running a batch of messages through a pipeline.

use serde::Deserialize;
use thiserror::Error;

/// How an executor reacts to a message the pipeline discarded.
///
/// # Variants
/// * `ContinueOnError` - Count the message as discarded and keep going (default)
/// * `FailFast` - Abort the whole batch on the first discarded message
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureStrategy {
    #[default]
    ContinueOnError,
    FailFast,
}

#[derive(Error, Debug)]
pub enum ExecutionError {
    /// A message was discarded while running under `FailFast`.
    #[error("Message {sequence} was discarded by the pipeline")]
    MessageDiscarded { sequence: u64 },

    /// A worker task panicked or was cancelled.
    #[error("Worker task failed: {message}")]
    InternalError { message: String },
}

impl From<tokio::task::JoinError> for ExecutionError {
    fn from(err: tokio::task::JoinError) -> Self {
        ExecutionError::InternalError {
            message: err.to_string(),
        }
    }
}
