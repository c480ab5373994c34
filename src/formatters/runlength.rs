// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::consts::DEFAULT_SEPARATOR;
use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::Message;
use crate::traits::Formatter;

/// Options for the `runlength` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunlengthConfig {
    pub separator: String,
    /// Write only the length, dropping the content.
    pub store_runlength_only: bool,
}

impl Default for RunlengthConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            store_runlength_only: false,
        }
    }
}

/// Prepends the content length in bytes and a separator.
pub struct RunlengthFormatter {
    content: Content,
    config: RunlengthConfig,
}

impl RunlengthFormatter {
    pub fn new(content: Content, config: RunlengthConfig) -> Self {
        Self { content, config }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }
}

impl Formatter for RunlengthFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let source = self.content.source_bytes(msg);
        let length = source.len().to_string();

        let data = if self.config.store_runlength_only {
            length.into_bytes()
        } else {
            let mut data = format!("{}{}", length, self.config.separator).into_bytes();
            data.extend_from_slice(&source);
            data
        };
        self.content.set_target_bytes(msg, data);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "runlength"
    }
}
