// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::Message;
use crate::traits::Formatter;

/// Options for the `extract_json` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractJsonConfig {
    /// Top-level field of the JSON object to extract.
    pub field: String,
    /// Strip surrounding whitespace from string values.
    pub trim_values: bool,
}

impl Default for ExtractJsonConfig {
    fn default() -> Self {
        Self {
            field: String::new(),
            trim_values: true,
        }
    }
}

/// Replaces a JSON object with the value of one of its fields.
///
/// Strings are written without quotes, any other value as JSON. A missing field
/// yields empty content.
pub struct ExtractJsonFormatter {
    content: Content,
    config: ExtractJsonConfig,
}

impl ExtractJsonFormatter {
    pub fn new(content: Content, config: ExtractJsonConfig) -> Self {
        Self { content, config }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }
}

impl Formatter for ExtractJsonFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_bytes(msg);
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(&data)?;

        let extracted = match object.get(&self.config.field) {
            None => String::new(),
            Some(serde_json::Value::String(s)) if self.config.trim_values => s.trim().to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        self.content.set_target_bytes(msg, extracted.into_bytes());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "extract_json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    #[test]
    fn extracts_field() {
        struct TestCase {
            field: &'static str,
            input: &'static str,
            expected: &'static str,
        }

        let cases = vec![
            TestCase {
                field: "test",
                input: r#"{"foo":"bar","test":"valid"}"#,
                expected: "valid",
            },
            TestCase {
                field: "test",
                input: r#"{"foo":"bar","test":999999999}"#,
                expected: "999999999",
            },
            TestCase {
                field: "test",
                input: r#"{"test":{"inner":[1,2]}}"#,
                expected: r#"{"inner":[1,2]}"#,
            },
            TestCase {
                field: "test",
                input: r#"{"test":"  padded "}"#,
                expected: "padded",
            },
            TestCase {
                field: "missing",
                input: r#"{"foo":"bar"}"#,
                expected: "",
            },
        ];

        for case in cases {
            let cfg = ModulatorConfig::new("extract_json").with_option("field", case.field);
            let mut msg = Message::new(case.input, StreamId::INVALID, 0);
            ExtractJsonFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();
            assert_eq!(msg.payload_str(), case.expected, "{}", case.input);
        }
    }

    #[test]
    fn malformed_json_is_an_error() {
        let cfg = ModulatorConfig::new("extract_json").with_option("field", "test");
        let mut msg = Message::new("{broken", StreamId::INVALID, 0);
        assert!(matches!(
            ExtractJsonFormatter::from_config(&cfg).unwrap().apply(&mut msg),
            Err(FormatError::Json(_))
        ));
        assert_eq!(msg.payload_str(), "{broken");
    }
}
