// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Directive driven conversion of structured text into JSON.
//!
//! The transition parser scans the input and each firing transition calls one of
//! the writer functions below with the bytes read since the previous transition.
//!
//! | function | effect |
//! |---|---|
//! | `key` | write `"data":` |
//! | `val` | write the trimmed data as a raw value |
//! | `esc` | write the data as a quoted string |
//! | `dat` | parse the data with `timestamp_read`, write it quoted using `timestamp_write` |
//! | `arr` / `obj` | open an array / object |
//! | `end` | close the innermost array or object |
//! | `arr+val`, `arr+esc` | open an array and write its first element |
//! | `val+end`, `esc+end`, `dat+end` | write a value, then close the container |

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::time_format::TimeLayout;
use crate::formatters::Content;
use crate::message::Message;
use crate::observability::messages::formatter::TimestampParseFailed;
use crate::observability::messages::StructuredLog;
use crate::parser::{StateId, TransitionDirective, TransitionParser};
use crate::traits::Formatter;

const DEFAULT_TIMESTAMP_READ: &str = "%Y%m%d%H%M%S";
const DEFAULT_TIMESTAMP_WRITE: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Options for the `text_to_json` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextToJsonConfig {
    /// State the parser starts in. Empty selects the state of the first directive.
    pub start_state: String,
    pub directives: Vec<String>,
    pub timestamp_read: String,
    pub timestamp_write: String,
}

impl Default for TextToJsonConfig {
    fn default() -> Self {
        Self {
            start_state: String::new(),
            directives: Vec::new(),
            timestamp_read: DEFAULT_TIMESTAMP_READ.to_string(),
            timestamp_write: DEFAULT_TIMESTAMP_WRITE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterAction {
    Key,
    Val,
    Esc,
    Dat,
    Arr,
    Obj,
    End,
    ArrVal,
    ArrEsc,
    ArrDat,
    ValEnd,
    EscEnd,
    DatEnd,
}

impl WriterAction {
    fn from_name(name: &str) -> Option<Self> {
        let action = match name {
            "key" => WriterAction::Key,
            "val" => WriterAction::Val,
            "esc" => WriterAction::Esc,
            "dat" => WriterAction::Dat,
            "arr" => WriterAction::Arr,
            "obj" => WriterAction::Obj,
            "end" => WriterAction::End,
            "arr+val" => WriterAction::ArrVal,
            "arr+esc" => WriterAction::ArrEsc,
            "arr+dat" => WriterAction::ArrDat,
            "val+end" => WriterAction::ValEnd,
            "esc+end" => WriterAction::EscEnd,
            "dat+end" => WriterAction::DatEnd,
            _ => return None,
        };
        Some(action)
    }
}

// Ordering matters: every state after ReadKey means a key is waiting for its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum WriterState {
    ArrayEnd,
    ObjectEnd,
    Object,
    ReadKey,
    ReadValue,
    Array,
    ArrayAppend,
}

impl WriterState {
    fn is_array(self) -> bool {
        matches!(self, WriterState::Array | WriterState::ArrayAppend)
    }

    /// State to continue in once the container opened in `self` is closed.
    fn after_close(self) -> WriterState {
        match self {
            WriterState::ReadValue => WriterState::ReadKey,
            WriterState::Array => WriterState::ArrayAppend,
            other => other,
        }
    }
}

/// Per message output buffer of the text-to-JSON conversion.
struct JsonWriter<'f> {
    formatter: &'f TextToJsonFormatter,
    out: Vec<u8>,
    state: WriterState,
    stack: Vec<WriterState>,
}

impl<'f> JsonWriter<'f> {
    fn new(formatter: &'f TextToJsonFormatter) -> Self {
        Self {
            formatter,
            out: vec![b'{'],
            state: WriterState::Object,
            stack: Vec::new(),
        }
    }

    fn run(&mut self, action: WriterAction, data: &[u8], state_name: &str) {
        match action {
            WriterAction::Key => self.write_key(data),
            WriterAction::Val => self.read_value(data, state_name),
            WriterAction::Esc => self.read_escaped(data, state_name),
            WriterAction::Dat => self.read_date(data, state_name),
            WriterAction::Arr => self.read_array(),
            WriterAction::Obj => self.read_object(),
            WriterAction::End => self.read_end(),
            WriterAction::ArrVal => {
                self.read_array();
                self.read_value(data, state_name);
            }
            WriterAction::ArrEsc => {
                self.read_array();
                self.read_escaped(data, state_name);
            }
            WriterAction::ArrDat => {
                self.read_array();
                self.read_date(data, state_name);
            }
            WriterAction::ValEnd => self.then_end(|w| w.read_value(data, state_name)),
            WriterAction::EscEnd => self.then_end(|w| w.read_escaped(data, state_name)),
            WriterAction::DatEnd => self.then_end(|w| w.read_date(data, state_name)),
        }
    }

    fn then_end<F>(&mut self, write: F)
    where
        F: FnOnce(&mut Self),
    {
        let state = self.state;
        write(self);
        self.state = state;
        self.read_end();
    }

    fn write_key(&mut self, key: &[u8]) {
        while self.state.is_array() {
            self.read_end();
        }
        if self.state > WriterState::ReadKey {
            self.out.extend_from_slice(b"null");
        }
        if self.state != WriterState::Object {
            self.out.push(b',');
        }
        self.out.push(b'"');
        self.out.extend_from_slice(key);
        self.out.extend_from_slice(b"\":");
        self.state = WriterState::ReadValue;
    }

    fn write_value(&mut self, value: &[u8], state_name: &str) {
        match self.state {
            WriterState::ReadValue => self.state = WriterState::ReadKey,
            WriterState::Array => self.state = WriterState::ArrayAppend,
            WriterState::ArrayAppend => self.out.push(b','),
            _ => {
                self.write_key(state_name.as_bytes());
                self.state = WriterState::ReadKey;
            }
        }
        self.out.extend_from_slice(value);
    }

    fn read_value(&mut self, data: &[u8], state_name: &str) {
        let value = data.trim_ascii();
        if !value.is_empty() {
            self.write_value(value, state_name);
        }
    }

    fn read_escaped(&mut self, data: &[u8], state_name: &str) {
        let data = data.trim_ascii();
        let mut value = Vec::with_capacity(data.len() + 2);
        value.push(b'"');
        value.extend_from_slice(data);
        value.push(b'"');
        self.write_value(&value, state_name);
    }

    fn read_date(&mut self, data: &[u8], state_name: &str) {
        let raw = String::from_utf8_lossy(data);
        let raw = raw.trim();
        let rendered = match self.formatter.timestamp_read.parse(raw) {
            Ok(time) => self.formatter.timestamp_write.format(&time),
            Err(err) => {
                TimestampParseFailed {
                    formatter: self.formatter.name(),
                    value: raw,
                    reason: &err.to_string(),
                }
                .log();
                raw.to_string()
            }
        };
        self.read_escaped(rendered.as_bytes(), state_name);
    }

    fn open(&mut self, bracket: u8) -> WriterState {
        if self.state == WriterState::ArrayAppend {
            self.out.push(b',');
        }
        self.out.push(bracket);
        self.stack.push(self.state);
        self.state
    }

    fn read_array(&mut self) {
        self.open(b'[');
        self.state = WriterState::Array;
    }

    fn read_object(&mut self) {
        self.open(b'{');
        self.state = WriterState::Object;
    }

    fn read_end(&mut self) {
        let Some(parent) = self.stack.pop() else {
            self.state = WriterState::ReadValue;
            return;
        };
        if self.state.is_array() {
            self.out.push(b']');
        } else {
            self.out.push(b'}');
        }
        self.state = parent.after_close();
    }

    fn finish(mut self, remains: Option<&[u8]>, state_name: &str) -> Vec<u8> {
        if let Some(remains) = remains {
            let remains = remains.trim_ascii();
            if !remains.is_empty() {
                self.read_escaped(remains, state_name);
            }
        }
        if self.out.len() > 1 {
            while matches!(
                self.state,
                WriterState::Array | WriterState::ArrayAppend | WriterState::Object
            ) && !self.stack.is_empty()
            {
                self.read_end();
            }
        }
        self.out.push(b'}');
        self.out.trim_ascii().to_vec()
    }
}

/// Converts text into a JSON object using transition directives.
pub struct TextToJsonFormatter {
    content: Content,
    parser: TransitionParser<WriterAction>,
    start: StateId,
    timestamp_read: TimeLayout,
    timestamp_write: TimeLayout,
}

impl TextToJsonFormatter {
    pub fn new(content: Content, config: TextToJsonConfig) -> Result<Self, ConfigError> {
        if config.directives.is_empty() {
            return Err(ConfigError::invalid_options("text_to_json", "no directives configured"));
        }

        let mut parser = TransitionParser::new();
        TransitionDirective::load_all(&config.directives, &mut parser, WriterAction::from_name)?;

        let start_name = if config.start_state.is_empty() {
            TransitionDirective::parse(&config.directives[0])?.state
        } else {
            config.start_state.clone()
        };
        let start = parser.state_id(&start_name).ok_or_else(|| {
            ConfigError::invalid_options(
                "text_to_json",
                format!("unknown start state '{}'", start_name),
            )
        })?;

        Ok(Self {
            content,
            parser,
            start,
            timestamp_read: TimeLayout::from_config("text_to_json", &config.timestamp_read)?,
            timestamp_write: TimeLayout::from_config("text_to_json", &config.timestamp_write)?,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for TextToJsonFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_bytes(msg);
        let mut writer = JsonWriter::new(self);

        let (remains, last_state) = self.parser.parse(&data, self.start, |action, bytes, state| {
            writer.run(*action, bytes, self.parser.state_name(state));
        });

        let json = writer.finish(remains, self.parser.state_name(last_state));
        self.content.set_target_bytes(msg, json);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "text_to_json"
    }
}
