// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::time_format::TimeLayout;
use crate::formatters::Content;
use crate::message::{Message, Value};
use crate::traits::Formatter;

/// Options for the `convert_time` formatter
///
/// Both formats are strftime strings. Empty (the default) means unix seconds.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertTimeConfig {
    pub from: String,
    pub to: String,
}

/// Converts a timestamp between formats.
///
/// Unix output is stored as an integer, formatted output as a string.
pub struct ConvertTimeFormatter {
    content: Content,
    from: TimeLayout,
    to: TimeLayout,
}

impl ConvertTimeFormatter {
    pub fn new(content: Content, config: ConvertTimeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            content,
            from: TimeLayout::from_config("convert_time", &config.from)?,
            to: TimeLayout::from_config("convert_time", &config.to)?,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }

    fn read(&self, msg: &Message) -> Result<DateTime<Utc>, FormatError> {
        if self.from == TimeLayout::UnixSeconds {
            let seconds = match self.content.source.get_value(msg) {
                Some(Value::Int(i)) => Some(i),
                Some(Value::Float(f)) => Some(f as i64),
                _ => None,
            };
            if let Some(seconds) = seconds {
                return Utc.timestamp_opt(seconds, 0).single().ok_or_else(|| {
                    FormatError::TimeParse {
                        value: seconds.to_string(),
                        reason: "timestamp out of range".to_string(),
                    }
                });
            }
        }
        self.from.parse(&self.content.source_string(msg))
    }
}

impl Formatter for ConvertTimeFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let time = self.read(msg)?;
        let value = match self.to {
            TimeLayout::UnixSeconds => Value::Int(time.timestamp()),
            _ => Value::String(self.to.format(&time)),
        };
        self.content.set_target_value(msg, value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "convert_time"
    }
}
