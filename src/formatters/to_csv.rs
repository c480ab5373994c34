// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::{Content, Field};
use crate::message::{Message, Metadata, Value};
use crate::observability::messages::formatter::UnsupportedValue;
use crate::observability::messages::StructuredLog;
use crate::traits::Formatter;

const DEFAULT_CSV_SEPARATOR: &str = ",";

/// Options for the `to_csv` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToCsvConfig {
    pub keys: Vec<String>,
    pub separator: String,
    pub keep_last_separator: bool,
}

impl Default for ToCsvConfig {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            separator: DEFAULT_CSV_SEPARATOR.to_string(),
            keep_last_separator: false,
        }
    }
}

/// Writes the values of `keys` as one separated line.
///
/// Values are read from the metadata root, or from the map at `source` when one is
/// configured explicitly. Missing keys and values without a flat rendering leave
/// their slot empty.
pub struct ToCsvFormatter {
    values: Field,
    target: Field,
    config: ToCsvConfig,
}

impl ToCsvFormatter {
    pub fn new(values: Field, content: Content, config: ToCsvConfig) -> Self {
        Self {
            values,
            target: content.target,
            config,
        }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        let values = Field::parse(cfg.source.as_deref().unwrap_or_default());
        Ok(Self::new(values, cfg.content(), cfg.options_as()?))
    }

    fn cell(&self, values: Option<&Metadata>, key: &str) -> String {
        let reason = match values.and_then(|map| map.get(key)) {
            Some(Value::Bool(b)) => return b.to_string(),
            Some(Value::Int(i)) => return i.to_string(),
            Some(Value::Float(f)) => return format!("{:.6}", f),
            Some(Value::String(s)) => return s.clone(),
            Some(Value::Bytes(b)) => return String::from_utf8_lossy(b).into_owned(),
            Some(_) => "unsupported datatype",
            None => "key not found",
        };
        UnsupportedValue {
            formatter: self.name(),
            key,
            reason,
        }
        .log();
        String::new()
    }
}

impl Formatter for ToCsvFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let values = match &self.values {
            Field::Payload => Some(&msg.metadata),
            Field::Metadata(key) => msg.metadata.get(key).and_then(Value::as_map),
        };

        let mut csv = String::new();
        for key in &self.config.keys {
            csv.push_str(&self.cell(values, key));
            csv.push_str(&self.config.separator);
        }
        if !self.config.keep_last_separator && !csv.is_empty() {
            csv.truncate(csv.len() - self.config.separator.len());
        }

        self.target.set_bytes(msg, csv.into_bytes());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "to_csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    fn message() -> Message {
        let mut msg = Message::new("PAYLOAD", StreamId::INVALID, 0);
        msg.metadata.set("foo", "value1");
        msg.metadata.set("bar", "value2");
        msg.metadata.set("flag", true);
        msg.metadata.set("count", 3i64);
        msg.metadata.set("ratio", 0.5f64);
        msg.metadata.set("nested/a", "x");
        msg
    }

    #[test]
    fn renders_values_in_key_order() {
        struct TestCase {
            keys: Vec<&'static str>,
            separator: Option<&'static str>,
            keep_last_separator: bool,
            expected: &'static str,
        }

        let cases = vec![
            TestCase {
                keys: vec!["foo", "bar"],
                separator: None,
                keep_last_separator: false,
                expected: "value1,value2",
            },
            TestCase {
                keys: vec!["foo", "bar"],
                separator: Some(";;"),
                keep_last_separator: true,
                expected: "value1;;value2;;",
            },
            TestCase {
                keys: vec!["flag", "count", "ratio"],
                separator: None,
                keep_last_separator: false,
                expected: "true,3,0.500000",
            },
            TestCase {
                keys: vec!["foo", "missing", "nested", "bar"],
                separator: None,
                keep_last_separator: false,
                expected: "value1,,,value2",
            },
            TestCase {
                keys: vec![],
                separator: None,
                keep_last_separator: false,
                expected: "",
            },
        ];

        for case in cases {
            let mut cfg = ModulatorConfig::new("to_csv")
                .with_option("keys", case.keys.clone())
                .with_option("keep_last_separator", case.keep_last_separator);
            if let Some(separator) = case.separator {
                cfg = cfg.with_option("separator", separator);
            }
            let mut msg = message();
            ToCsvFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();
            assert_eq!(msg.payload_str(), case.expected, "{:?}", case.keys);
        }
    }

    #[test]
    fn applies_to_metadata_target() {
        let cfg = ModulatorConfig::new("to_csv")
            .with_apply_to("baz")
            .with_option("keys", vec!["foo", "bar"]);
        let mut msg = message();
        ToCsvFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert_eq!(msg.payload_str(), "PAYLOAD");
        assert_eq!(msg.metadata.get_string("baz").as_deref(), Some("value1,value2"));
    }
}
