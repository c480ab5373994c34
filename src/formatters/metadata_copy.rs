// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;
use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::engine::ModulatorArray;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::{Content, FormatterFactory};
use crate::message::{Message, Value};
use crate::traits::{Formatter, ModulateResult, Modulator};

/// One entry of `write_to`: a plain key, or keys mapped to the modulators that
/// transform the copy before it is stored.
///
/// ```yaml
/// write_to:
///   - raw
///   - encoded:
///       - type: base64_encode
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WriteTarget {
    Key(String),
    Nested(IndexMap<String, Vec<ModulatorConfig>>),
}

/// Options for the `metadata_copy` formatter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataCopyConfig {
    pub write_to: Vec<WriteTarget>,
}

/// Copies the applied content into one or more metadata keys.
///
/// Each copy runs through its own modulators on a clone of the message. A copy
/// whose modulators do not continue is stored as an empty value.
pub struct MetadataCopyFormatter {
    content: Content,
    targets: Vec<(String, ModulatorArray)>,
}

impl MetadataCopyFormatter {
    pub fn new(content: Content, config: MetadataCopyConfig) -> Result<Self, ConfigError> {
        let mut targets = Vec::new();
        for entry in config.write_to {
            match entry {
                WriteTarget::Key(key) => targets.push((key, ModulatorArray::default())),
                WriteTarget::Nested(map) => {
                    for (key, modulators) in map {
                        targets.push((key, FormatterFactory::build_pipeline(&modulators)?));
                    }
                }
            }
        }
        Ok(Self { content, targets })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for MetadataCopyFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_bytes(msg);
        for (key, modulators) in &self.targets {
            let mut copy = msg.clone_message();
            copy.payload = data.clone();
            let value = match modulators.modulate(&mut copy) {
                ModulateResult::Continue => copy.payload,
                _ => Vec::new(),
            };
            msg.metadata.set(key, Value::Bytes(value));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "metadata_copy"
    }
}
