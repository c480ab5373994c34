// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Formatters that cut the content at a delimiter.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::{Message, Value};
use crate::traits::Formatter;

const DEFAULT_PICK_DELIMITER: &str = ":";
const DEFAULT_FIELD_DELIMITER: &str = ",";
const DEFAULT_JSON_SPLIT_BY: &str = "|";

/// Options for the `split_pick` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitPickConfig {
    pub delimiter: String,
    pub index: usize,
}

impl Default for SplitPickConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_PICK_DELIMITER.to_string(),
            index: 0,
        }
    }
}

/// Keeps the n-th part of the content. An index out of range yields empty content.
pub struct SplitPickFormatter {
    content: Content,
    config: SplitPickConfig,
}

impl SplitPickFormatter {
    pub fn new(content: Content, config: SplitPickConfig) -> Result<Self, ConfigError> {
        if config.delimiter.is_empty() {
            return Err(ConfigError::invalid_options("split_pick", "delimiter must not be empty"));
        }
        Ok(Self { content, config })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for SplitPickFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_string(msg);
        let picked = data
            .split(self.config.delimiter.as_str())
            .nth(self.config.index)
            .unwrap_or_default()
            .as_bytes()
            .to_vec();
        self.content.set_target_bytes(msg, picked);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "split_pick"
    }
}

/// Options for the `split_to_fields` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitToFieldsConfig {
    pub delimiter: String,
    pub fields: Vec<String>,
}

impl Default for SplitToFieldsConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
            fields: Vec::new(),
        }
    }
}

/// Splits the content and stores part `i` under `fields[i]` in the target metadata.
///
/// Parts beyond the number of configured fields are ignored.
pub struct SplitToFieldsFormatter {
    content: Content,
    config: SplitToFieldsConfig,
}

impl SplitToFieldsFormatter {
    pub fn new(content: Content, config: SplitToFieldsConfig) -> Result<Self, ConfigError> {
        if config.delimiter.is_empty() {
            return Err(ConfigError::invalid_options("split_to_fields", "delimiter must not be empty"));
        }
        Ok(Self { content, config })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for SplitToFieldsFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_string(msg);
        let tree = self.content.target_metadata(msg);
        for (field, part) in self
            .config
            .fields
            .iter()
            .zip(data.split(self.config.delimiter.as_str()))
        {
            tree.set(field, part);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "split_to_fields"
    }
}

/// Options for the `split` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitConfig {
    pub delimiter: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_FIELD_DELIMITER.to_string(),
        }
    }
}

/// Splits the content into an array stored in a metadata key.
pub struct SplitFormatter {
    content: Content,
    delimiter: String,
}

impl SplitFormatter {
    pub fn new(content: Content, config: SplitConfig) -> Result<Self, ConfigError> {
        if !content.target.is_metadata() {
            return Err(ConfigError::invalid_options("split", "target must be a metadata key"));
        }
        if config.delimiter.is_empty() {
            return Err(ConfigError::invalid_options("split", "delimiter must not be empty"));
        }
        Ok(Self {
            content,
            delimiter: config.delimiter,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for SplitFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_string(msg);
        let parts = data
            .split(self.delimiter.as_str())
            .map(Value::from)
            .collect();
        self.content.set_target_value(msg, Value::Array(parts));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "split"
    }
}

/// Options for the `split_to_json` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitToJsonConfig {
    pub split_by: String,
    pub keys: Vec<String>,
}

impl Default for SplitToJsonConfig {
    fn default() -> Self {
        Self {
            split_by: DEFAULT_JSON_SPLIT_BY.to_string(),
            keys: Vec::new(),
        }
    }
}

/// Zips the parts of the content with `keys` into a JSON object.
///
/// The object has as many entries as the shorter of both lists, in key order.
/// Every part is written as an escaped JSON string.
pub struct SplitToJsonFormatter {
    content: Content,
    config: SplitToJsonConfig,
}

impl SplitToJsonFormatter {
    pub fn new(content: Content, config: SplitToJsonConfig) -> Result<Self, ConfigError> {
        if config.split_by.is_empty() {
            return Err(ConfigError::invalid_options("split_to_json", "split_by must not be empty"));
        }
        Ok(Self { content, config })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for SplitToJsonFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_string(msg);
        let object: IndexMap<&str, &str> = self
            .config
            .keys
            .iter()
            .map(String::as_str)
            .zip(data.split(self.config.split_by.as_str()))
            .collect();
        let json = serde_json::to_vec(&object)?;
        self.content.set_target_bytes(msg, json);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "split_to_json"
    }
}
