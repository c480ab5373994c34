// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors a formatter can return while transforming a single message.
//!
//! A formatter error never aborts a pipeline directly. The `FormatterModulator`
//! wrapping each formatter logs it and turns it into a discard result.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Invalid base64 content: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The formatter requires a metadata key as source or target.
    #[error("{formatter} requires {field} to be a metadata key")]
    NotMetadata {
        formatter: &'static str,
        field: &'static str,
    },

    #[error("Required field '{0}' not found")]
    MissingField(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Content does not match any pattern: {0}")]
    NoPatternMatched(String),

    #[error("IP address '{0}' could not be resolved")]
    UnresolvedAddress(String),

    /// A nested modulator returned something other than `Continue`.
    #[error("Nested modulator '{id}' returned {result}")]
    ChildModulator { id: String, result: String },

    #[error("Cannot cast '{value}' to {to_type}")]
    InvalidCast { value: String, to_type: String },

    #[error("Cannot parse time '{value}': {reason}")]
    TimeParse { value: String, reason: String },
}
