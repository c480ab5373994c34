// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Column-wise rewriting of delimiter separated values.
//!
//! Directives have the form `index:operation[:parameter...]`:
//!
//! | operation | parameters | effect |
//! |---|---|---|
//! | `time` | from, to | reformat a timestamp at the start of the column |
//! | `replace` | old, new | replace every occurrence |
//! | `prefix` / `postfix` | text | add text before / after |
//! | `trim` | [characters] | trim characters (default space) from both ends |
//! | `quote` | | wrap the column in double quotes on output |
//! | `remove` | | drop the column |
//! | `agent` | [fields...] | insert user-agent fields after the column |
//!
//! Directives run in order and address columns by their position at the time they
//! run, so removing or inserting columns shifts the indices of later directives.

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::time_format::TimeLayout;
use crate::formatters::user_agent::{UserAgent, DIRECTIVE_AGENT_FIELDS};
use crate::formatters::Content;
use crate::message::Message;
use crate::observability::messages::formatter::{ContentPassedThrough, TimestampParseFailed};
use crate::observability::messages::StructuredLog;
use crate::parser::{split_fields, unescape};
use crate::traits::Formatter;

const DEFAULT_TSV_DELIMITER: &str = "\t";
const DEFAULT_TRIM: &str = " ";

/// Options for the `process_tsv` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessTsvConfig {
    pub directives: Vec<String>,
    pub delimiter: String,
    /// Columns may be wrapped in double quotes and contain the delimiter.
    pub quoted_values: bool,
}

impl Default for ProcessTsvConfig {
    fn default() -> Self {
        Self {
            directives: Vec::new(),
            delimiter: DEFAULT_TSV_DELIMITER.to_string(),
            quoted_values: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TsvOperation {
    Time { from: TimeLayout, to: TimeLayout },
    Replace { old: String, new: String },
    Prefix(String),
    Postfix(String),
    Trim(String),
    Quote,
    Remove,
    Agent(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
struct TsvDirective {
    index: usize,
    operation: TsvOperation,
}

impl TsvDirective {
    fn parse(directive: &str) -> Result<Self, ConfigError> {
        let fields = split_fields(directive);
        if fields.len() < 2 {
            return Err(ConfigError::invalid_directive(directive, "expected index:operation"));
        }
        let index = fields[0].trim().parse::<usize>().map_err(|e| {
            ConfigError::invalid_directive(directive, format!("invalid column index: {}", e))
        })?;
        let params: Vec<String> = fields[2..].iter().map(|p| unescape(p)).collect();
        let arity = |expected: usize| {
            if params.len() == expected {
                Ok(())
            } else {
                Err(ConfigError::invalid_directive(
                    directive,
                    format!("expected {} parameter(s), found {}", expected, params.len()),
                ))
            }
        };

        let operation = match fields[1].trim().to_lowercase().as_str() {
            "time" => {
                arity(2)?;
                TsvOperation::Time {
                    from: TimeLayout::from_config("process_tsv", &params[0])?,
                    to: TimeLayout::from_config("process_tsv", &params[1])?,
                }
            }
            "replace" => {
                arity(2)?;
                TsvOperation::Replace {
                    old: params[0].clone(),
                    new: params[1].clone(),
                }
            }
            "prefix" => {
                arity(1)?;
                TsvOperation::Prefix(params[0].clone())
            }
            "postfix" => {
                arity(1)?;
                TsvOperation::Postfix(params[0].clone())
            }
            "trim" => match params.as_slice() {
                [] => TsvOperation::Trim(DEFAULT_TRIM.to_string()),
                [characters] => TsvOperation::Trim(characters.clone()),
                _ => return Err(ConfigError::invalid_directive(directive, "trim takes at most one parameter")),
            },
            "quote" => TsvOperation::Quote,
            "remove" => TsvOperation::Remove,
            "agent" => {
                if let Some(unknown) = params.iter().find(|f| !UserAgent::is_known_field(f)) {
                    return Err(ConfigError::invalid_directive(
                        directive,
                        format!("unknown agent field '{}'", unknown),
                    ));
                }
                if params.is_empty() {
                    TsvOperation::Agent(DIRECTIVE_AGENT_FIELDS.iter().map(|f| f.to_string()).collect())
                } else {
                    TsvOperation::Agent(params.clone())
                }
            }
            other => {
                return Err(ConfigError::invalid_directive(
                    directive,
                    format!("unknown operation '{}'", other),
                ))
            }
        };
        Ok(Self { index, operation })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TsvValue {
    quoted: bool,
    value: String,
}

impl TsvValue {
    fn plain(value: &str) -> Self {
        Self {
            quoted: false,
            value: value.to_string(),
        }
    }

    fn quoted(value: &str) -> Self {
        Self {
            quoted: true,
            value: value.to_string(),
        }
    }
}

/// Rewrites columns of a delimiter separated line.
pub struct ProcessTsvFormatter {
    content: Content,
    directives: Vec<TsvDirective>,
    delimiter: String,
    quoted_values: bool,
}

impl ProcessTsvFormatter {
    pub fn new(content: Content, config: ProcessTsvConfig) -> Result<Self, ConfigError> {
        if config.delimiter.is_empty() {
            return Err(ConfigError::invalid_options("process_tsv", "delimiter must not be empty"));
        }
        let directives = config
            .directives
            .iter()
            .map(|d| TsvDirective::parse(d))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            content,
            directives,
            delimiter: config.delimiter,
            quoted_values: config.quoted_values,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }

    fn split(&self, data: &str) -> Option<Vec<TsvValue>> {
        if self.quoted_values {
            split_quoted(data, &self.delimiter)
        } else {
            Some(data.split(self.delimiter.as_str()).map(TsvValue::plain).collect())
        }
    }

    fn process(&self, directive: &TsvDirective, values: &mut Vec<TsvValue>) {
        let index = directive.index;
        if index >= values.len() {
            return;
        }
        let column = &mut values[index];
        match &directive.operation {
            TsvOperation::Time { from, to } => match from.parse_prefix(&column.value) {
                Ok((time, _)) => column.value = to.format(&time),
                Err(e) => TimestampParseFailed {
                    formatter: self.name(),
                    value: &column.value,
                    reason: &e.to_string(),
                }
                .log(),
            },
            TsvOperation::Replace { old, new } => column.value = column.value.replace(old.as_str(), new),
            TsvOperation::Prefix(prefix) => column.value.insert_str(0, prefix),
            TsvOperation::Postfix(postfix) => column.value.push_str(postfix),
            TsvOperation::Trim(characters) => {
                column.value = column
                    .value
                    .trim_matches(|c: char| characters.contains(c))
                    .to_string()
            }
            TsvOperation::Quote => column.quoted = true,
            TsvOperation::Remove => {
                values.remove(index);
            }
            TsvOperation::Agent(fields) => {
                let agent = UserAgent::parse(&column.value);
                let inserted: Vec<TsvValue> = fields
                    .iter()
                    .filter_map(|f| agent.field(f))
                    .map(|v| TsvValue::plain(&v.as_string()))
                    .collect();
                values.splice(index + 1..index + 1, inserted);
            }
        }
    }
}

/// Split a line whose columns may be wrapped in double quotes.
///
/// Returns `None` when a quoted column is not terminated.
fn split_quoted(data: &str, delimiter: &str) -> Option<Vec<TsvValue>> {
    let opening = format!("{}\"", delimiter);
    let closing = format!("\"{}", delimiter);
    let mut values = Vec::new();
    let mut remainder = data;

    loop {
        if let Some(rest) = remainder.strip_prefix('"') {
            remainder = rest;
        } else {
            match remainder.split_once(opening.as_str()) {
                Some((plain, rest)) => {
                    values.extend(plain.split(delimiter).map(TsvValue::plain));
                    remainder = rest;
                }
                None => {
                    values.extend(remainder.split(delimiter).map(TsvValue::plain));
                    return Some(values);
                }
            }
        }

        match remainder.split_once(closing.as_str()) {
            Some((quoted, rest)) => {
                values.push(TsvValue::quoted(quoted));
                remainder = rest;
            }
            None => {
                values.push(TsvValue::quoted(remainder.strip_suffix('"')?));
                return Some(values);
            }
        }
    }
}

impl Formatter for ProcessTsvFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        if self.directives.is_empty() {
            return Ok(());
        }

        let data = self.content.source_string(msg);
        let Some(mut values) = self.split(&data) else {
            ContentPassedThrough {
                formatter: self.name(),
                reason: "unmatched quote",
            }
            .log();
            return Ok(());
        };

        for directive in &self.directives {
            self.process(directive, &mut values);
        }

        let line = values
            .iter()
            .map(|v| {
                if v.quoted {
                    format!("\"{}\"", v.value)
                } else {
                    v.value.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(&self.delimiter);
        self.content.set_target_bytes(msg, line.into_bytes());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "process_tsv"
    }
}
