// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! InfluxDB line protocol output.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::Message;
use crate::traits::Formatter;

const DEFAULT_TIME_FIELD: &str = "time";
const DEFAULT_MEASUREMENT_FIELD: &str = "measurement";

fn escape(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) fn escape_measurement(value: &str) -> String {
    escape(value, &[',', ' '])
}

/// Escaping for tag keys, tag values and field keys.
pub(crate) fn escape_tag(value: &str) -> String {
    escape(value, &[',', '=', ' '])
}

pub(crate) fn escape_field_value(value: &str) -> String {
    escape(value, &['"'])
}

fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Options for the `json_to_influx10` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsonToInflux10Config {
    /// Field holding the unix timestamp in seconds. The message time is used when
    /// it is missing.
    pub time_field: String,
    /// Field holding the measurement name. Required in every message.
    pub measurement: String,
    /// Fields written as tags; all other fields become values.
    pub tags: Vec<String>,
    pub ignore: Vec<String>,
}

impl Default for JsonToInflux10Config {
    fn default() -> Self {
        Self {
            time_field: DEFAULT_TIME_FIELD.to_string(),
            measurement: DEFAULT_MEASUREMENT_FIELD.to_string(),
            tags: Vec::new(),
            ignore: Vec::new(),
        }
    }
}

/// Converts a flat JSON object into one InfluxDB 1.0 line.
///
/// Output: `measurement[,tag=value...] field=value[,field=value...] timestamp`.
/// Tags and fields keep the order of the JSON object. Nested values are skipped.
pub struct JsonToInflux10Formatter {
    content: Content,
    config: JsonToInflux10Config,
}

impl JsonToInflux10Formatter {
    pub fn new(content: Content, config: JsonToInflux10Config) -> Self {
        Self { content, config }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }

    fn timestamp(&self, values: &mut IndexMap<String, serde_json::Value>, msg: &Message) -> Result<i64, FormatError> {
        let Some(raw) = values.shift_remove(&self.config.time_field) else {
            return Ok(msg.timestamp.timestamp());
        };
        let text = scalar_text(&raw).unwrap_or_default();
        text.trim().parse::<i64>().map_err(|e| FormatError::TimeParse {
            value: text.clone(),
            reason: e.to_string(),
        })
    }
}

impl Formatter for JsonToInflux10Formatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let mut values: IndexMap<String, serde_json::Value> =
            serde_json::from_slice(&self.content.source_bytes(msg))?;

        let timestamp = self.timestamp(&mut values, msg)?;
        let measurement = values
            .shift_remove(&self.config.measurement)
            .and_then(|m| scalar_text(&m))
            .ok_or_else(|| FormatError::MissingField(self.config.measurement.clone()))?;

        let mut tags = Vec::new();
        let mut fields = Vec::new();
        for (key, value) in &values {
            if self.config.ignore.contains(key) {
                continue;
            }
            let Some(text) = scalar_text(value) else {
                continue;
            };
            if self.config.tags.contains(key) {
                tags.push(format!("{}={}", escape_tag(key), escape_tag(&text)));
            } else {
                fields.push(format!("{}={}", escape_tag(key), escape_field_value(&text)));
            }
        }

        let mut line = escape_measurement(&measurement);
        if !tags.is_empty() {
            line.push(',');
            line.push_str(&tags.join(","));
        }
        line.push(' ');
        line.push_str(&fields.join(","));
        line.push(' ');
        line.push_str(&timestamp.to_string());

        self.content.set_target_bytes(msg, line.into_bytes());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json_to_influx10"
    }
}
