// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Key-wise rewriting of JSON objects.
//!
//! Directives have the form `key:operation[:parameter...]` and run in order:
//!
//! * `split:delimiter:key...` stores the parts of the value under the listed keys
//! * `replace:old:new`
//! * `trim[:characters]` (default space and tab)
//! * `rename:new_key`
//! * `remove[:value...]` removes the key, or only when it holds one of the values
//! * `time:from:to` reformats a timestamp
//! * `agent[:field...]` stores user-agent fields as `{key}_{field}`
//!
//! Keys may address nested objects with `/`. Directives on missing keys or
//! non-string values are skipped.

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::time_format::TimeLayout;
use crate::formatters::user_agent::{UserAgent, DIRECTIVE_AGENT_FIELDS};
use crate::formatters::Content;
use crate::message::{Message, Metadata, Value};
use crate::observability::messages::formatter::{ContentPassedThrough, TimestampParseFailed};
use crate::observability::messages::StructuredLog;
use crate::parser::{split_fields, unescape};
use crate::traits::Formatter;

const DEFAULT_JSON_TRIM: &str = " \t";

/// Options for the `process_json` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessJsonConfig {
    pub directives: Vec<String>,
    /// Trim spaces from every top-level string value after the directives ran.
    pub trim_values: bool,
}

impl Default for ProcessJsonConfig {
    fn default() -> Self {
        Self {
            directives: Vec::new(),
            trim_values: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum JsonOperation {
    Split { delimiter: String, keys: Vec<String> },
    Replace { old: String, new: String },
    Trim(String),
    Rename(String),
    Remove(Vec<String>),
    Time { from: TimeLayout, to: TimeLayout },
    Agent(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
struct JsonDirective {
    key: String,
    operation: JsonOperation,
}

impl JsonDirective {
    fn parse(directive: &str) -> Result<Self, ConfigError> {
        let fields = split_fields(directive);
        if fields.len() < 2 || fields[0].is_empty() {
            return Err(ConfigError::invalid_directive(directive, "expected key:operation"));
        }
        let params: Vec<String> = fields[2..].iter().map(|p| unescape(p)).collect();
        let invalid = |reason: &str| ConfigError::invalid_directive(directive, reason);

        let operation = match (fields[1].to_lowercase().as_str(), params.as_slice()) {
            ("split", [delimiter, keys @ ..]) if !delimiter.is_empty() => JsonOperation::Split {
                delimiter: delimiter.clone(),
                keys: keys.to_vec(),
            },
            ("split", _) => return Err(invalid("split needs a delimiter")),
            ("replace", [old, new]) => JsonOperation::Replace {
                old: old.clone(),
                new: new.clone(),
            },
            ("replace", _) => return Err(invalid("replace needs two parameters")),
            ("trim", []) => JsonOperation::Trim(DEFAULT_JSON_TRIM.to_string()),
            ("trim", [characters]) => JsonOperation::Trim(characters.clone()),
            ("trim", _) => return Err(invalid("trim takes at most one parameter")),
            ("rename", [new_key]) if !new_key.is_empty() => JsonOperation::Rename(new_key.clone()),
            ("rename", _) => return Err(invalid("rename needs a new key")),
            ("remove", values) => JsonOperation::Remove(values.to_vec()),
            ("time", [from, to]) => JsonOperation::Time {
                from: TimeLayout::from_config("process_json", from)?,
                to: TimeLayout::from_config("process_json", to)?,
            },
            ("time", _) => return Err(invalid("time needs two formats")),
            ("agent", names) => {
                if let Some(unknown) = names.iter().find(|f| !UserAgent::is_known_field(f)) {
                    return Err(invalid(&format!("unknown agent field '{}'", unknown)));
                }
                if names.is_empty() {
                    JsonOperation::Agent(DIRECTIVE_AGENT_FIELDS.iter().map(|f| f.to_string()).collect())
                } else {
                    JsonOperation::Agent(names.to_vec())
                }
            }
            (other, _) => return Err(invalid(&format!("unknown operation '{}'", other))),
        };

        Ok(Self {
            key: fields[0].clone(),
            operation,
        })
    }
}

/// Rewrites values of a JSON object.
pub struct ProcessJsonFormatter {
    content: Content,
    directives: Vec<JsonDirective>,
    trim_values: bool,
}

impl ProcessJsonFormatter {
    pub fn new(content: Content, config: ProcessJsonConfig) -> Result<Self, ConfigError> {
        let directives = config
            .directives
            .iter()
            .map(|d| JsonDirective::parse(d))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            content,
            directives,
            trim_values: config.trim_values,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }

    fn process(&self, directive: &JsonDirective, values: &mut Metadata) {
        let key = directive.key.as_str();
        match &directive.operation {
            JsonOperation::Rename(new_key) => {
                if let Some(value) = values.remove(key) {
                    values.set(new_key, value);
                }
                return;
            }
            JsonOperation::Remove(only) if only.is_empty() => {
                values.remove(key);
                return;
            }
            _ => {}
        }

        let Some(Value::String(text)) = values.get(key).cloned() else {
            return;
        };

        match &directive.operation {
            JsonOperation::Split { delimiter, keys } => {
                if text.contains(delimiter.as_str()) {
                    for (target, part) in keys.iter().zip(text.split(delimiter.as_str())) {
                        values.set(target, part);
                    }
                }
            }
            JsonOperation::Replace { old, new } => values.set(key, text.replace(old.as_str(), new)),
            JsonOperation::Trim(characters) => {
                values.set(key, text.trim_matches(|c: char| characters.contains(c)))
            }
            JsonOperation::Remove(only) => {
                if only.contains(&text) {
                    values.remove(key);
                }
            }
            JsonOperation::Time { from, to } => match from.parse_prefix(&text) {
                Ok((time, _)) => values.set(key, to.format(&time)),
                Err(e) => TimestampParseFailed {
                    formatter: self.name(),
                    value: &text,
                    reason: &e.to_string(),
                }
                .log(),
            },
            JsonOperation::Agent(fields) => {
                let agent = UserAgent::parse(&text);
                for field in fields {
                    if let Some(value) = agent.field(field) {
                        values.set(&format!("{}_{}", key, field), value);
                    }
                }
            }
            JsonOperation::Rename(_) => {}
        }
    }
}

impl Formatter for ProcessJsonFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        if self.directives.is_empty() && !self.trim_values {
            return Ok(());
        }

        let data = self.content.source_bytes(msg);
        let mut values = match serde_json::from_slice::<serde_json::Map<String, serde_json::Value>>(&data) {
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

        for directive in &self.directives {
            self.process(directive, &mut values);
        }

        if self.trim_values {
            let keys: Vec<String> = values.keys().cloned().collect();
            for key in keys {
                if let Some(Value::String(text)) = values.get_mut(&key) {
                    *text = text.trim_matches(' ').to_string();
                }
            }
        }

        let json = serde_json::to_vec(&values)?;
        self.content.set_target_bytes(msg, json);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "process_json"
    }
}
