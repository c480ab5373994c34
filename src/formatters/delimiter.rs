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

/// Options for the `delimiter` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DelimiterConfig {
    pub delimiter: String,
}

impl Default for DelimiterConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_LINE_DELIMITER.to_string(),
        }
    }
}

/// Appends a delimiter to the content.
pub struct DelimiterFormatter {
    content: Content,
    delimiter: Vec<u8>,
}

impl DelimiterFormatter {
    pub fn new(content: Content, config: DelimiterConfig) -> Self {
        Self {
            content,
            delimiter: unescape(&config.delimiter).into_bytes(),
        }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }
}

impl Formatter for DelimiterFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let mut data = self.content.source_bytes(msg);
        data.extend_from_slice(&self.delimiter);
        self.content.set_target_bytes(msg, data);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "delimiter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    #[test]
    fn appends_delimiter() {
        let cases = vec![(None, "test\n"), (Some(";"), "test;"), (Some("\\r\\n"), "test\r\n")];

        for (delimiter, expected) in cases {
            let mut cfg = ModulatorConfig::new("delimiter");
            if let Some(d) = delimiter {
                cfg = cfg.with_option("delimiter", d);
            }
            let mut msg = Message::new("test", StreamId::INVALID, 0);
            DelimiterFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();
            assert_eq!(msg.payload_str(), expected);
        }
    }

    #[test]
    fn empty_and_missing_sources() {
        struct TestCase {
            config: ModulatorConfig,
            payload: &'static str,
            expected_payload: &'static str,
            expected_meta: Option<&'static str>,
        }

        let cases = vec![
            TestCase {
                config: ModulatorConfig::new("delimiter"),
                payload: "",
                expected_payload: "\n",
                expected_meta: None,
            },
            TestCase {
                config: ModulatorConfig::new("delimiter").with_apply_to("line"),
                payload: "PAYLOAD",
                expected_payload: "PAYLOAD",
                expected_meta: Some("\n"),
            },
            TestCase {
                config: ModulatorConfig::new("delimiter").with_option("delimiter", ""),
                payload: "test",
                expected_payload: "test",
                expected_meta: None,
            },
        ];

        for case in cases {
            let mut msg = Message::new(case.payload, StreamId::INVALID, 0);
            DelimiterFormatter::from_config(&case.config).unwrap().apply(&mut msg).unwrap();
            assert_eq!(msg.payload_str(), case.expected_payload);
            assert_eq!(msg.metadata.get_string("line").as_deref(), case.expected_meta);
        }
    }

    #[test]
    fn rejects_unknown_options() {
        let cfg = ModulatorConfig::new("delimiter").with_option("separator", ";");
        assert!(DelimiterFormatter::from_config(&cfg).is_err());
    }
}
