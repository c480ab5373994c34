// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::{Message, Metadata, Value};
use crate::traits::Formatter;

const DEFAULT_FLATTEN_SEPARATOR: &str = ".";

/// Options for the `flatten` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlattenConfig {
    pub separator: String,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_FLATTEN_SEPARATOR.to_string(),
        }
    }
}

/// Flattens a metadata tree into `{source}{separator}{path}` keys.
///
/// Nested maps are walked recursively; every other value, arrays included, is
/// copied as is. The source must be a metadata key.
pub struct FlattenFormatter {
    content: Content,
    prefix: String,
    separator: String,
}

impl FlattenFormatter {
    pub fn new(content: Content, config: FlattenConfig) -> Result<Self, ConfigError> {
        let Some(source) = content.source.key() else {
            return Err(ConfigError::invalid_options(
                "flatten",
                "source must be a metadata key",
            ));
        };
        let prefix = format!("{}{}", source, config.separator);
        Ok(Self {
            content,
            prefix,
            separator: config.separator,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }

    fn flatten(&self, prefix: &str, node: &Metadata, target: &mut Metadata) {
        for (key, value) in node.iter() {
            let flat_key = format!("{}{}", prefix, key);
            match value {
                Value::Map(child) => {
                    self.flatten(&format!("{}{}", flat_key, self.separator), child, target)
                }
                other => target.set(&flat_key, other.clone()),
            }
        }
    }
}

impl Formatter for FlattenFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let node = self.content.source_metadata(msg)?;
        let target = self.content.target_metadata(msg);
        self.flatten(&self.prefix, &node, target);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "flatten"
    }
}
