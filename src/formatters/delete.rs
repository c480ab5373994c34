// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::{Field, NoOptions};
use crate::message::Message;
use crate::traits::Formatter;

/// Empties the payload or removes a metadata key. Registered as `delete` and `clear`.
pub struct DeleteFormatter {
    target: Field,
}

impl DeleteFormatter {
    pub fn new(target: Field) -> Self {
        Self { target }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        cfg.options_as::<NoOptions>()?;
        Ok(Self::new(cfg.content().target))
    }
}

impl Formatter for DeleteFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        self.target.clear(msg);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "delete"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    #[test]
    fn clears_payload_by_default() {
        let mut msg = Message::new("test", StreamId::INVALID, 0);
        DeleteFormatter::from_config(&ModulatorConfig::new("delete"))
            .unwrap()
            .apply(&mut msg)
            .unwrap();
        assert!(msg.payload.is_empty());
    }

    #[test]
    fn removes_metadata_key_and_keeps_payload() {
        let mut msg = Message::new("test", StreamId::INVALID, 0);
        msg.metadata.set("foo", "bar");

        let cfg = ModulatorConfig::new("clear").with_apply_to("foo");
        DeleteFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert!(msg.metadata.get("foo").is_none());
        assert_eq!(msg.payload_str(), "test");
    }
}
