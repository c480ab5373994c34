// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::{Content, NoOptions};
use crate::message::{Message, Value};
use crate::traits::Formatter;

/// How `copy` combines the source with the existing target.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CopyMode {
    /// Overwrite the target, keeping the source value's type.
    #[default]
    Replace,
    /// target + separator + source
    Append,
    /// source + separator + target
    Prepend,
}

/// Options for the `copy` formatter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CopyConfig {
    pub mode: CopyMode,
    pub separator: String,
}

/// Copies the source field into the target field.
pub struct CopyFormatter {
    content: Content,
    mode: CopyMode,
    separator: Vec<u8>,
}

impl CopyFormatter {
    pub fn new(content: Content, config: CopyConfig) -> Self {
        Self {
            content,
            mode: config.mode,
            separator: config.separator.into_bytes(),
        }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }

    fn joined(&self, first: Vec<u8>, second: &[u8]) -> Vec<u8> {
        let mut data = first;
        data.reserve(self.separator.len() + second.len());
        data.extend_from_slice(&self.separator);
        data.extend_from_slice(second);
        data
    }
}

impl Formatter for CopyFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        match self.mode {
            CopyMode::Replace => {
                let value = self.content.source.get_value(msg).unwrap_or(Value::Null);
                self.content.set_target_value(msg, value);
            }
            CopyMode::Append => {
                let source = self.content.source_bytes(msg);
                let target = self.content.target.get_bytes(msg);
                self.content.set_target_bytes(msg, self.joined(target, &source));
            }
            CopyMode::Prepend => {
                let source = self.content.source_bytes(msg);
                let target = self.content.target.get_bytes(msg);
                self.content.set_target_bytes(msg, self.joined(source, &target));
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "copy"
    }
}

/// Copies the source into the target, then clears the source.
pub struct MoveFormatter {
    content: Content,
}

impl MoveFormatter {
    pub fn new(content: Content) -> Self {
        Self { content }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        cfg.options_as::<NoOptions>()?;
        Ok(Self::new(cfg.content()))
    }
}

impl Formatter for MoveFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        if self.content.source == self.content.target {
            return Ok(());
        }
        let value = self.content.source.get_value(msg).unwrap_or(Value::Null);
        self.content.set_target_value(msg, value);
        self.content.source.clear(msg);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "move"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    fn message(payload: &str) -> Message {
        let mut msg = Message::new(payload, StreamId::INVALID, 0);
        msg.metadata.set("foo", Value::Bytes(b"foo".to_vec()));
        msg
    }

    #[test]
    fn copy_modes() {
        struct TestCase {
            name: &'static str,
            config: ModulatorConfig,
            expected_payload: &'static str,
        }

        let cases = vec![
            TestCase {
                name: "replace",
                config: ModulatorConfig::new("copy").with_source("foo"),
                expected_payload: "foo",
            },
            TestCase {
                name: "append",
                config: ModulatorConfig::new("copy")
                    .with_source("foo")
                    .with_option("mode", "append")
                    .with_option("separator", " "),
                expected_payload: "test foo",
            },
            TestCase {
                name: "prepend",
                config: ModulatorConfig::new("copy")
                    .with_source("foo")
                    .with_option("mode", "prepend")
                    .with_option("separator", " "),
                expected_payload: "foo test",
            },
        ];

        for case in cases {
            let formatter = CopyFormatter::from_config(&case.config).unwrap();
            let mut msg = message("test");
            formatter.apply(&mut msg).unwrap();
            assert_eq!(msg.payload_str(), case.expected_payload, "{}", case.name);
        }
    }

    #[test]
    fn copy_payload_to_new_key() {
        let cfg = ModulatorConfig::new("copy").with_source("").with_target("bar");
        let mut msg = message("test");
        CopyFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert_eq!(msg.payload_str(), "test");
        assert_eq!(msg.metadata.get_bytes("bar").unwrap(), b"test");
    }

    #[test]
    fn replace_keeps_value_type() {
        let cfg = ModulatorConfig::new("copy").with_source("num").with_target("copy");
        let mut msg = message("");
        msg.metadata.set("num", 42i64);
        CopyFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert_eq!(msg.metadata.get("copy"), Some(&Value::Int(42)));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let cfg = ModulatorConfig::new("copy").with_option("mode", "sideways");
        assert!(CopyFormatter::from_config(&cfg).is_err());
    }

    #[test]
    fn move_payload_to_metadata() {
        let cfg = ModulatorConfig::new("move").with_target("bar");
        let mut msg = message("test");
        MoveFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert_eq!(msg.payload_str(), "");
        assert_eq!(msg.metadata.get_bytes("bar").unwrap(), b"test");
    }

    #[test]
    fn move_between_metadata_keys() {
        let cfg = ModulatorConfig::new("move").with_source("foo").with_target("bar");
        let mut msg = message("payload");
        MoveFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert_eq!(msg.payload_str(), "payload");
        assert_eq!(msg.metadata.get_string("bar").as_deref(), Some("foo"));
        assert!(!msg.metadata.contains("foo"));
    }
}
