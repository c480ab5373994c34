// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::consts::DEFAULT_TIMESTAMP_FORMAT;
use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::time_format::validate_strftime;
use crate::formatters::Content;
use crate::message::Message;
use crate::traits::Formatter;

/// Options for the `timestamp` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimestampConfig {
    /// chrono strftime format
    pub format: String,
}

impl Default for TimestampConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

/// Prepends the message timestamp.
pub struct TimestampFormatter {
    content: Content,
    format: String,
}

impl TimestampFormatter {
    pub fn new(content: Content, config: TimestampConfig) -> Result<Self, ConfigError> {
        validate_strftime("timestamp", &config.format)?;
        Ok(Self {
            content,
            format: config.format,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for TimestampFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let mut data = msg.timestamp.format(&self.format).to_string().into_bytes();
        data.extend_from_slice(&self.content.source_bytes(msg));
        self.content.set_target_bytes(msg, data);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "timestamp"
    }
}
