// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::consts::DEFAULT_SEPARATOR;
use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::Message;
use crate::traits::Formatter;

/// Options for the `sequence` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SequenceConfig {
    pub separator: String,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// Prepends the message sequence number and a separator.
pub struct SequenceFormatter {
    content: Content,
    separator: String,
}

impl SequenceFormatter {
    pub fn new(content: Content, config: SequenceConfig) -> Self {
        Self {
            content,
            separator: config.separator,
        }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }
}

impl Formatter for SequenceFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let mut data = format!("{}{}", msg.sequence, self.separator).into_bytes();
        data.extend_from_slice(&self.content.source_bytes(msg));
        self.content.set_target_bytes(msg, data);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "sequence"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    #[test]
    fn prepends_sequence() {
        let mut msg = Message::new("test", StreamId::INVALID, 42);
        SequenceFormatter::from_config(&ModulatorConfig::new("sequence"))
            .unwrap()
            .apply(&mut msg)
            .unwrap();
        assert_eq!(msg.payload_str(), "42:test");
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
                config: ModulatorConfig::new("sequence"),
                payload: "",
                expected_payload: "7:",
                expected_meta: None,
            },
            TestCase {
                config: ModulatorConfig::new("sequence")
                    .with_source("missing")
                    .with_target("seq")
                    .with_option("separator", " "),
                payload: "PAYLOAD",
                expected_payload: "PAYLOAD",
                expected_meta: Some("7 "),
            },
        ];

        for case in cases {
            let mut msg = Message::new(case.payload, StreamId::INVALID, 7);
            SequenceFormatter::from_config(&case.config).unwrap().apply(&mut msg).unwrap();
            assert_eq!(msg.payload_str(), case.expected_payload);
            assert_eq!(msg.metadata.get_string("seq").as_deref(), case.expected_meta);
        }
    }

    #[test]
    fn rejects_unknown_options() {
        let cfg = ModulatorConfig::new("sequence").with_option("start", "1");
        assert!(SequenceFormatter::from_config(&cfg).is_err());
    }
}
