// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::consts::DEFAULT_LINE_DELIMITER;
use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::Message;
use crate::parser::unescape;
use crate::traits::Formatter;

/// Options for the `envelope` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvelopeConfig {
    pub prefix: String,
    pub postfix: String,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            postfix: DEFAULT_LINE_DELIMITER.to_string(),
        }
    }
}

/// Wraps the content in a prefix and a postfix.
///
/// `\n`, `\r` and `\t` sequences in both strings become control characters.
pub struct EnvelopeFormatter {
    content: Content,
    prefix: Vec<u8>,
    postfix: Vec<u8>,
}

impl EnvelopeFormatter {
    pub fn new(content: Content, config: EnvelopeConfig) -> Self {
        Self {
            content,
            prefix: unescape(&config.prefix).into_bytes(),
            postfix: unescape(&config.postfix).into_bytes(),
        }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }
}

impl Formatter for EnvelopeFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_bytes(msg);
        let mut wrapped = Vec::with_capacity(self.prefix.len() + data.len() + self.postfix.len());
        wrapped.extend_from_slice(&self.prefix);
        wrapped.extend_from_slice(&data);
        wrapped.extend_from_slice(&self.postfix);
        self.content.set_target_bytes(msg, wrapped);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "envelope"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    #[test]
    fn wraps_content() {
        struct TestCase {
            config: ModulatorConfig,
            expected: &'static str,
        }

        let cases = vec![
            TestCase {
                config: ModulatorConfig::new("envelope"),
                expected: "test\n",
            },
            TestCase {
                config: ModulatorConfig::new("envelope")
                    .with_option("prefix", "start\\t")
                    .with_option("postfix", "\\r\\nend"),
                expected: "start\ttest\r\nend",
            },
        ];

        for case in cases {
            let mut msg = Message::new("test", StreamId::INVALID, 0);
            EnvelopeFormatter::from_config(&case.config)
                .unwrap()
                .apply(&mut msg)
                .unwrap();
            assert_eq!(msg.payload_str(), case.expected);
        }
    }

    #[test]
    fn applies_to_metadata() {
        let cfg = ModulatorConfig::new("envelope")
            .with_apply_to("foo")
            .with_option("prefix", "<")
            .with_option("postfix", ">");
        let mut msg = Message::new("test", StreamId::INVALID, 0);
        msg.metadata.set("foo", "bar");

        EnvelopeFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();
        assert_eq!(msg.metadata.get_string("foo").as_deref(), Some("<bar>"));
        assert_eq!(msg.payload_str(), "test");
    }
}
