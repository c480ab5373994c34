// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use base64::alphabet::Alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD, STANDARD};
use base64::Engine;
use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::{Content, NoOptions};
use crate::message::Message;
use crate::traits::Formatter;

const DICTIONARY_LEN: usize = 64;

/// Options for the `base64_encode` formatter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Base64EncodeConfig {
    /// 64 character alphabet replacing the standard one. Empty means standard.
    pub dictionary: String,
}

/// Encodes the content as padded base64.
pub struct Base64EncodeFormatter {
    content: Content,
    engine: GeneralPurpose,
}

impl Base64EncodeFormatter {
    pub fn new(content: Content, config: Base64EncodeConfig) -> Result<Self, ConfigError> {
        let engine = if config.dictionary.is_empty() {
            STANDARD
        } else {
            if config.dictionary.len() != DICTIONARY_LEN {
                return Err(ConfigError::invalid_options(
                    "base64_encode",
                    format!("dictionary must contain {} characters", DICTIONARY_LEN),
                ));
            }
            let alphabet = Alphabet::new(&config.dictionary)
                .map_err(|e| ConfigError::invalid_options("base64_encode", e))?;
            GeneralPurpose::new(&alphabet, PAD)
        };
        Ok(Self { content, engine })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for Base64EncodeFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let encoded = self.engine.encode(self.content.source_bytes(msg));
        self.content.set_target_bytes(msg, encoded.into_bytes());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "base64_encode"
    }
}

/// Decodes standard base64 content. Invalid input is an error.
pub struct Base64DecodeFormatter {
    content: Content,
}

impl Base64DecodeFormatter {
    pub fn new(content: Content) -> Self {
        Self { content }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        cfg.options_as::<NoOptions>()?;
        Ok(Self::new(cfg.content()))
    }
}

impl Formatter for Base64DecodeFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let decoded = STANDARD.decode(self.content.source_bytes(msg))?;
        self.content.set_target_bytes(msg, decoded);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "base64_decode"
    }
}
