// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::NoOptions;
use crate::message::Message;
use crate::traits::Formatter;

/// Leaves the message untouched.
#[derive(Debug, Default)]
pub struct ForwardFormatter;

impl ForwardFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        cfg.options_as::<NoOptions>()?;
        Ok(Self)
    }
}

impl Formatter for ForwardFormatter {
    fn apply(&self, _msg: &mut Message) -> Result<(), FormatError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "forward"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    #[test]
    fn message_is_unchanged() {
        let mut msg = Message::new("test", StreamId::INVALID, 0);
        msg.metadata.set("key", "value");
        let before = msg.clone();

        ForwardFormatter::new().apply(&mut msg).unwrap();
        assert_eq!(msg, before);
    }

    #[test]
    fn empty_message_is_unchanged() {
        let mut msg = Message::new("", StreamId::INVALID, 0);
        let before = msg.clone();

        ForwardFormatter::from_config(&ModulatorConfig::new("forward"))
            .unwrap()
            .apply(&mut msg)
            .unwrap();
        assert_eq!(msg, before);
    }

    #[test]
    fn rejects_any_option() {
        let cfg = ModulatorConfig::new("forward").with_option("delimiter", ";");
        assert!(ForwardFormatter::from_config(&cfg).is_err());
    }
}
