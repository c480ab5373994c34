// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::{Field, NoOptions};
use crate::message::Message;
use crate::traits::Formatter;

/// Writes the serialized message (see [`Message::serialize`]) plus a newline.
pub struct SerializeFormatter {
    target: Field,
}

impl SerializeFormatter {
    pub fn new(target: Field) -> Self {
        Self { target }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        cfg.options_as::<NoOptions>()?;
        Ok(Self::new(cfg.content().target))
    }
}

impl Formatter for SerializeFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let mut line = msg.serialize();
        line.push('\n');
        self.target.set_bytes(msg, line.into_bytes());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "serialize"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    #[test]
    fn serialized_payload_deserializes() {
        let original = Message::new("hello world", StreamId::of("serialize_test"), 7);
        let mut msg = original.clone();
        SerializeFormatter::new(Field::Payload).apply(&mut msg).unwrap();

        assert!(msg.payload.ends_with(b"\n"));
        let restored = Message::deserialize(&msg.payload_str()).unwrap();
        assert_eq!(restored.payload, original.payload);
        assert_eq!(restored.sequence, 7);
        assert_eq!(restored.stream_id, original.stream_id);
    }

    #[test]
    fn empty_payload_into_metadata() {
        let cfg = ModulatorConfig::new("serialize").with_target("wire");
        let mut msg = Message::new("", StreamId::INVALID, 3);

        SerializeFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert!(msg.payload.is_empty());
        let line = msg.metadata.get_string("wire").unwrap();
        assert!(line.ends_with(":3:\n"), "{}", line);
        let restored = Message::deserialize(&line).unwrap();
        assert!(restored.payload.is_empty());
        assert_eq!(restored.sequence, 3);
    }

    #[test]
    fn rejects_any_option() {
        let cfg = ModulatorConfig::new("serialize").with_option("encoding", "base64");
        assert!(SerializeFormatter::from_config(&cfg).is_err());
    }
}
