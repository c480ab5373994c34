// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::{Content, Field};
use crate::message::{Message, Metadata, Value};
use crate::traits::Formatter;

/// Options for the `to_json` formatter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToJsonConfig {
    /// Metadata path of the map to serialize instead of the whole metadata.
    pub root: String,
    /// Top-level keys left out of the output.
    pub ignore: Vec<String>,
}

/// Serializes message metadata into a JSON object.
///
/// Values are read from the metadata root, or from the map at `source` when one is
/// configured explicitly. Keys keep their insertion order. A missing `root` yields
/// `{}`; a `root` that is not a map is an error.
pub struct ToJsonFormatter {
    values: Field,
    target: Field,
    config: ToJsonConfig,
}

impl ToJsonFormatter {
    pub fn new(values: Field, content: Content, config: ToJsonConfig) -> Self {
        Self {
            values,
            target: content.target,
            config,
        }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        let values = Field::parse(cfg.source.as_deref().unwrap_or_default());
        Ok(Self::new(values, cfg.content(), cfg.options_as()?))
    }

    fn selected<'m>(&self, msg: &'m Message) -> Result<Option<&'m Metadata>, FormatError> {
        let base = match &self.values {
            Field::Payload => &msg.metadata,
            Field::Metadata(key) => match msg.metadata.get(key) {
                Some(Value::Map(map)) => map,
                Some(_) => return Err(FormatError::Parse(format!("metadata key '{}' is not a map", key))),
                None => return Ok(None),
            },
        };
        if self.config.root.is_empty() {
            return Ok(Some(base));
        }
        match base.get(&self.config.root) {
            None => Ok(None),
            Some(Value::Map(map)) => Ok(Some(map)),
            Some(_) => Err(FormatError::Parse(format!(
                "root '{}' is not a map",
                self.config.root
            ))),
        }
    }
}

impl Formatter for ToJsonFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let json = match self.selected(msg)? {
            None => b"{}".to_vec(),
            Some(map) if self.config.ignore.is_empty() => serde_json::to_vec(map)?,
            Some(map) => {
                let filtered: Metadata = map
                    .iter()
                    .filter(|(key, _)| !self.config.ignore.contains(key))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                serde_json::to_vec(&filtered)?
            }
        };
        self.target.set_bytes(msg, json);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "to_json"
    }
}
