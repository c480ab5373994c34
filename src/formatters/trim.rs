// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::consts::DEFAULT_TRIM_CHARACTERS;
use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::Message;
use crate::traits::Formatter;

/// Options for the `trim` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrimConfig {
    /// Set of characters removed from both ends.
    pub characters: String,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            characters: DEFAULT_TRIM_CHARACTERS.to_string(),
        }
    }
}

/// Removes a set of characters from both ends of the content.
pub struct TrimFormatter {
    content: Content,
    characters: Vec<char>,
}

impl TrimFormatter {
    pub fn new(content: Content, config: TrimConfig) -> Self {
        Self {
            content,
            characters: config.characters.chars().collect(),
        }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }
}

impl Formatter for TrimFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_string(msg);
        let trimmed = data.trim_matches(|c| self.characters.contains(&c));
        self.content.set_target_bytes(msg, trimmed.as_bytes().to_vec());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "trim"
    }
}

/// Options for the `trim_to_bounds` formatter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrimToBoundsConfig {
    pub left_bounds: String,
    pub right_bounds: String,
    pub left_offset: usize,
    pub right_offset: usize,
}

/// Cuts the content down to the part between a left and a right bound.
///
/// The left side ends after the first occurrence of `left_bounds`, searched from
/// `left_offset`. The right side ends at the last occurrence of `right_bounds`
/// before the final `right_offset` bytes. A bound that is not found leaves that
/// side of the content as is.
pub struct TrimToBoundsFormatter {
    content: Content,
    config: TrimToBoundsConfig,
}

impl TrimToBoundsFormatter {
    pub fn new(content: Content, config: TrimToBoundsConfig) -> Self {
        Self { content, config }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }

    fn bounds(&self, data: &[u8]) -> (usize, usize) {
        let left = self.config.left_bounds.as_bytes();
        let right = self.config.right_bounds.as_bytes();

        let mut end = data.len().saturating_sub(self.config.right_offset);
        if end > 0 && !right.is_empty() {
            end = rfind(&data[..end], right).unwrap_or(data.len());
        }

        let mut start = self.config.left_offset.min(data.len().saturating_sub(1));
        if start < data.len() && !left.is_empty() {
            if let Some(idx) = find(&data[start..], left) {
                start += idx + left.len();
            }
        }
        (start, end)
    }
}

impl Formatter for TrimToBoundsFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_bytes(msg);
        let (start, end) = self.bounds(&data);
        let trimmed = if end < start {
            Vec::new()
        } else {
            data[start..end].to_vec()
        };
        self.content.set_target_bytes(msg, trimmed);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "trim_to_bounds"
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}
