// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::{fnv1a64, Message};
use crate::traits::Formatter;

const TIME_SEQUENCE_MODULO: u64 = 10_000_000;

/// How `identifier` derives an id from a message.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierGenerator {
    /// FNV-1a 64 hash of the source, lowercase hex
    Hash,
    /// `%y%m%d%H%M%S` of the message timestamp + 7 digit sequence
    #[default]
    Time,
    /// Decimal sequence number
    Seq,
    /// 16 digit hex sequence number
    Seqhex,
}

/// Options for the `identifier` formatter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentifierConfig {
    pub generator: IdentifierGenerator,
}

/// Replaces the target with an identifier for the message.
pub struct IdentifierFormatter {
    content: Content,
    generator: IdentifierGenerator,
}

impl IdentifierFormatter {
    pub fn new(content: Content, config: IdentifierConfig) -> Self {
        Self {
            content,
            generator: config.generator,
        }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }

    fn generate(&self, msg: &Message) -> String {
        match self.generator {
            IdentifierGenerator::Hash => format!("{:x}", fnv1a64(&self.content.source_bytes(msg))),
            IdentifierGenerator::Time => format!(
                "{}{:07}",
                msg.timestamp.format("%y%m%d%H%M%S"),
                msg.sequence % TIME_SEQUENCE_MODULO
            ),
            IdentifierGenerator::Seq => msg.sequence.to_string(),
            IdentifierGenerator::Seqhex => format!("{:016x}", msg.sequence),
        }
    }
}

impl Formatter for IdentifierFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let id = self.generate(msg);
        self.content.set_target_bytes(msg, id.into_bytes());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "identifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;
    use chrono::{TimeZone, Utc};

    #[test]
    fn generators() {
        struct TestCase {
            generator: &'static str,
            expected: &'static str,
        }

        let cases = vec![
            TestCase {
                generator: "hash",
                expected: "f9e6e6ef197c2b25",
            },
            TestCase {
                generator: "time",
                expected: "1706091230150000042",
            },
            TestCase {
                generator: "seq",
                expected: "42",
            },
            TestCase {
                generator: "seqhex",
                expected: "000000000000002a",
            },
        ];

        for case in cases {
            let cfg = ModulatorConfig::new("identifier").with_option("generator", case.generator);
            let mut msg = Message::new("test", StreamId::INVALID, 42)
                .with_timestamp(Utc.with_ymd_and_hms(2017, 6, 9, 12, 30, 15).unwrap());
            IdentifierFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();
            assert_eq!(msg.payload_str(), case.expected, "{}", case.generator);
        }
    }

    #[test]
    fn writes_id_to_metadata() {
        let cfg = ModulatorConfig::new("identifier")
            .with_target("id")
            .with_option("generator", "hash");
        let mut msg = Message::new("test", StreamId::INVALID, 0);
        IdentifierFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert_eq!(msg.metadata.get_string("id").as_deref(), Some("f9e6e6ef197c2b25"));
        assert_eq!(msg.payload_str(), "test");
    }
}
