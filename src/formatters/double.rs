// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::engine::ModulatorArray;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::{Content, FormatterFactory};
use crate::message::Message;
use crate::traits::{Formatter, ModulateResult, Modulator};

const DEFAULT_DOUBLE_SEPARATOR: &str = ":";

/// Options for the `double` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DoubleConfig {
    pub left: Vec<ModulatorConfig>,
    pub right: Vec<ModulatorConfig>,
    pub separator: String,
    pub use_left_stream_id: bool,
}

impl Default for DoubleConfig {
    fn default() -> Self {
        Self {
            left: Vec::new(),
            right: Vec::new(),
            separator: DEFAULT_DOUBLE_SEPARATOR.to_string(),
            use_left_stream_id: false,
        }
    }
}

/// Runs two pipelines on copies of the message and joins their results.
///
/// The source field of the left copy, the separator and the source field of the
/// right copy are concatenated into the target. The stream id is taken from the
/// right copy unless `use_left_stream_id` is set.
pub struct DoubleFormatter {
    content: Content,
    left: ModulatorArray,
    right: ModulatorArray,
    separator: Vec<u8>,
    use_left_stream_id: bool,
}

impl DoubleFormatter {
    pub fn new(content: Content, config: DoubleConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            content,
            left: FormatterFactory::build_pipeline(&config.left)?,
            right: FormatterFactory::build_pipeline(&config.right)?,
            separator: config.separator.into_bytes(),
            use_left_stream_id: config.use_left_stream_id,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }

    fn run_side(side: &str, pipeline: &ModulatorArray, msg: &Message) -> Result<Message, FormatError> {
        let mut copy = msg.clone_message();
        match pipeline.modulate(&mut copy) {
            ModulateResult::Continue => Ok(copy),
            result => Err(FormatError::ChildModulator {
                id: side.to_string(),
                result: result.to_string(),
            }),
        }
    }
}

impl Formatter for DoubleFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let left = Self::run_side("left", &self.left, msg)?;
        let right = Self::run_side("right", &self.right, msg)?;

        let mut data = self.content.source_bytes(&left);
        data.extend_from_slice(&self.separator);
        data.extend_from_slice(&self.content.source_bytes(&right));
        self.content.set_target_bytes(msg, data);

        let stream_id = if self.use_left_stream_id {
            left.stream_id
        } else {
            right.stream_id
        };
        if stream_id != msg.stream_id {
            msg.set_stream_id(stream_id);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "double"
    }
}
