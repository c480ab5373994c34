// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::{Message, Value};
use crate::traits::Formatter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CastType {
    #[default]
    String,
    Bytes,
    Float,
    Int,
}

impl CastType {
    fn as_str(self) -> &'static str {
        match self {
            CastType::String => "string",
            CastType::Bytes => "bytes",
            CastType::Float => "float",
            CastType::Int => "int",
        }
    }
}

/// Options for the `cast` formatter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CastConfig {
    pub to_type: CastType,
}

/// Stores the source as a typed value.
pub struct CastFormatter {
    content: Content,
    to_type: CastType,
}

impl CastFormatter {
    pub fn new(content: Content, config: CastConfig) -> Self {
        Self {
            content,
            to_type: config.to_type,
        }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }

    fn invalid(&self, value: &str) -> FormatError {
        FormatError::InvalidCast {
            value: value.to_string(),
            to_type: self.to_type.as_str().to_string(),
        }
    }
}

impl Formatter for CastFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let value = match self.to_type {
            CastType::String => Value::String(self.content.source_string(msg)),
            CastType::Bytes => Value::Bytes(self.content.source_bytes(msg)),
            CastType::Int => {
                let raw = self.content.source_string(msg);
                Value::Int(raw.parse().map_err(|_| self.invalid(&raw))?)
            }
            CastType::Float => {
                let raw = self.content.source_string(msg);
                Value::Float(raw.parse().map_err(|_| self.invalid(&raw))?)
            }
        };
        self.content.set_target_value(msg, value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "cast"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    #[test]
    fn casts_metadata_values() {
        struct TestCase {
            to_type: &'static str,
            input: &'static str,
            expected: Option<Value>,
        }

        let cases = vec![
            TestCase {
                to_type: "string",
                input: "42",
                expected: Some(Value::String("42".to_string())),
            },
            TestCase {
                to_type: "bytes",
                input: "42",
                expected: Some(Value::Bytes(b"42".to_vec())),
            },
            TestCase {
                to_type: "int",
                input: "-42",
                expected: Some(Value::Int(-42)),
            },
            TestCase {
                to_type: "float",
                input: "1.5",
                expected: Some(Value::Float(1.5)),
            },
            TestCase {
                to_type: "int",
                input: "4.2",
                expected: None,
            },
            TestCase {
                to_type: "float",
                input: "abc",
                expected: None,
            },
        ];

        for case in cases {
            let cfg = ModulatorConfig::new("cast")
                .with_apply_to("value")
                .with_option("to_type", case.to_type);
            let mut msg = Message::new("PAYLOAD", StreamId::INVALID, 0);
            msg.metadata.set("value", case.input);

            let result = CastFormatter::from_config(&cfg).unwrap().apply(&mut msg);

            match case.expected {
                Some(expected) => {
                    assert!(result.is_ok(), "{} {}", case.to_type, case.input);
                    assert_eq!(msg.metadata.get("value"), Some(&expected));
                }
                None => assert!(
                    matches!(result, Err(FormatError::InvalidCast { .. })),
                    "{} {}",
                    case.to_type,
                    case.input
                ),
            }
        }
    }

    #[test]
    fn unknown_type_is_a_config_error() {
        let cfg = ModulatorConfig::new("cast").with_option("to_type", "bool");
        assert!(CastFormatter::from_config(&cfg).is_err());
    }

    #[test]
    fn empty_and_missing_sources() {
        struct TestCase {
            to_type: &'static str,
            payload: &'static str,
            apply_to: Option<&'static str>,
            expected: Option<Value>,
        }

        let cases = vec![
            TestCase {
                to_type: "string",
                payload: "PAYLOAD",
                apply_to: Some("missing"),
                expected: Some(Value::String(String::new())),
            },
            TestCase {
                to_type: "bytes",
                payload: "PAYLOAD",
                apply_to: Some("missing"),
                expected: Some(Value::Bytes(Vec::new())),
            },
            TestCase {
                to_type: "int",
                payload: "PAYLOAD",
                apply_to: Some("missing"),
                expected: None,
            },
            TestCase {
                to_type: "float",
                payload: "",
                apply_to: None,
                expected: None,
            },
        ];

        for case in cases {
            let mut cfg = ModulatorConfig::new("cast").with_option("to_type", case.to_type);
            if let Some(key) = case.apply_to {
                cfg = cfg.with_apply_to(key);
            }
            let mut msg = Message::new(case.payload, StreamId::INVALID, 0);

            let result = CastFormatter::from_config(&cfg).unwrap().apply(&mut msg);

            match case.expected {
                Some(expected) => {
                    assert!(result.is_ok(), "{}", case.to_type);
                    assert_eq!(msg.metadata.get("missing"), Some(&expected));
                    assert_eq!(msg.payload_str(), case.payload);
                }
                None => assert!(
                    matches!(result, Err(FormatError::InvalidCast { .. })),
                    "{}",
                    case.to_type
                ),
            }
        }
    }

    #[test]
    fn defaults_to_string_and_rejects_unknown_options() {
        let mut msg = Message::new("42", StreamId::INVALID, 0);
        CastFormatter::from_config(&ModulatorConfig::new("cast"))
            .unwrap()
            .apply(&mut msg)
            .unwrap();
        assert_eq!(msg.payload_str(), "42");

        let cfg = ModulatorConfig::new("cast").with_option("type", "int");
        assert!(CastFormatter::from_config(&cfg).is_err());
    }
}
