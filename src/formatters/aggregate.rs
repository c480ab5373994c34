// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::FormatterFactory;
use crate::message::Message;
use crate::traits::{Formatter, ModulateResult, Modulator};

/// Options for the `aggregate` formatter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregateConfig {
    pub modulators: Vec<ModulatorConfig>,
}

/// Runs a list of nested modulators as a single formatter.
///
/// Every child is configured with the aggregate's `apply_to`, replacing its own, so
/// the whole group works on one field. Children are expected to be plain formatters:
/// a child that discards or falls back fails the aggregate.
pub struct AggregateFormatter {
    children: Vec<(String, Box<dyn Modulator>)>,
}

impl AggregateFormatter {
    pub fn new(apply_to: Option<&str>, config: AggregateConfig) -> Result<Self, ConfigError> {
        let children = config
            .modulators
            .into_iter()
            .enumerate()
            .map(|(index, mut child)| {
                child.apply_to = apply_to.map(str::to_string);
                let modulator = FormatterFactory::create_modulator(&child, index)?;
                Ok((child.display_id(index), modulator))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self { children })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.apply_to.as_deref(), cfg.options_as()?)
    }
}

impl Formatter for AggregateFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        for (id, child) in &self.children {
            let result = child.modulate(msg);
            if result != ModulateResult::Continue {
                return Err(FormatError::ChildModulator {
                    id: id.clone(),
                    result: result.to_string(),
                });
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "aggregate"
    }
}
