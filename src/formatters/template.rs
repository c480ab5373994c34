// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Text templates with `{{ .key }}` placeholders.
//!
//! A placeholder names a dotted path (`{{ .a.b }}`) that is looked up in a
//! metadata map. Missing keys render as empty text, maps and arrays render as JSON.

use regex::Regex;
use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::{Content, Field};
use crate::message::{Message, Metadata, PATH_SEPARATOR};
use crate::observability::messages::formatter::ContentPassedThrough;
use crate::observability::messages::StructuredLog;
use crate::traits::Formatter;

const PLACEHOLDER: &str = r"\{\{\s*\.([A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*)\s*\}\}";

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Text(String),
    /// Metadata path, already converted to `/` separators.
    Key(String),
}

/// A template compiled into literal text and key lookups.
#[derive(Debug, Clone, PartialEq)]
struct CompiledTemplate {
    segments: Vec<Segment>,
}

impl CompiledTemplate {
    fn compile(template: &str) -> Result<Self, ConfigError> {
        let placeholder = Regex::new(PLACEHOLDER)?;
        let mut segments = Vec::new();
        let mut last = 0;
        for captures in placeholder.captures_iter(template) {
            let (Some(whole), Some(path)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Text(template[last..whole.start()].to_string()));
            }
            segments.push(Segment::Key(path.as_str().replace('.', &PATH_SEPARATOR.to_string())));
            last = whole.end();
        }
        if last < template.len() {
            segments.push(Segment::Text(template[last..].to_string()));
        }
        Ok(Self { segments })
    }

    fn render(&self, values: &Metadata) -> Vec<u8> {
        let mut out = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.extend_from_slice(text.as_bytes()),
                Segment::Key(path) => {
                    if let Some(value) = values.get(path) {
                        out.extend_from_slice(&value.as_bytes());
                    }
                }
            }
        }
        out
    }
}

/// Options for the `template` and `template_json` formatters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TemplateConfig {
    pub template: String,
}

/// Renders the template with values from the source metadata.
///
/// A payload source uses the message's metadata root; a key source uses the map
/// stored at that key.
pub struct TemplateFormatter {
    content: Content,
    template: CompiledTemplate,
}

impl TemplateFormatter {
    pub fn new(content: Content, config: TemplateConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            content,
            template: CompiledTemplate::compile(&config.template)?,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for TemplateFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let rendered = match &self.content.source {
            Field::Payload => self.template.render(&msg.metadata),
            Field::Metadata(key) => match msg.metadata.get(key).and_then(|v| v.as_map()) {
                Some(values) => self.template.render(values),
                None => self.template.render(&Metadata::new()),
            },
        };
        self.content.set_target_bytes(msg, rendered);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "template"
    }
}

/// Renders the template with values from the source parsed as a JSON object.
///
/// Content that is not a JSON object is left unchanged.
pub struct TemplateJsonFormatter {
    content: Content,
    template: CompiledTemplate,
}

impl TemplateJsonFormatter {
    pub fn new(content: Content, config: TemplateConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            content,
            template: CompiledTemplate::compile(&config.template)?,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for TemplateJsonFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_bytes(msg);
        let values = match serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&data) {
            Ok(object) => Metadata::from(object),
            Err(e) => {
                ContentPassedThrough {
                    formatter: self.name(),
                    reason: &e.to_string(),
                }
                .log();
                return Ok(());
            }
        };
        self.content.set_target_bytes(msg, self.template.render(&values));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "template_json"
    }
}
