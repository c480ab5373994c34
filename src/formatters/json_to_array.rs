// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::{Message, PATH_SEPARATOR};
use crate::observability::messages::formatter::UnsupportedValue;
use crate::observability::messages::StructuredLog;
use crate::traits::Formatter;

const DEFAULT_ARRAY_SEPARATOR: &str = ",";

/// Options for the `json_to_array` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsonToArrayConfig {
    /// Keys read from the JSON object, in output order. `a/b` reads nested keys.
    pub fields: Vec<String>,
    pub separator: String,
}

impl Default for JsonToArrayConfig {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            separator: DEFAULT_ARRAY_SEPARATOR.to_string(),
        }
    }
}

/// Turns a JSON object into one separated line holding the values of `fields`.
///
/// Strings, numbers and booleans are written as text. Missing fields and nested
/// values leave their slot empty.
pub struct JsonToArrayFormatter {
    content: Content,
    config: JsonToArrayConfig,
}

impl JsonToArrayFormatter {
    pub fn new(content: Content, config: JsonToArrayConfig) -> Self {
        Self { content, config }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }

    fn cell(&self, object: &serde_json::Value, field: &str) -> String {
        let pointer = format!("/{}", field.split(PATH_SEPARATOR).collect::<Vec<_>>().join("/"));
        let reason = match object.pointer(&pointer) {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(serde_json::Value::Number(n)) => return n.to_string(),
            Some(serde_json::Value::Bool(b)) => return b.to_string(),
            Some(_) => "unsupported datatype",
            None => "key not found",
        };
        UnsupportedValue {
            formatter: self.name(),
            key: field,
            reason,
        }
        .log();
        String::new()
    }
}

impl Formatter for JsonToArrayFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(&self.content.source_bytes(msg))?;
        let object = serde_json::Value::Object(object);

        let line = self
            .config
            .fields
            .iter()
            .map(|field| self.cell(&object, field))
            .collect::<Vec<_>>()
            .join(&self.config.separator);

        self.content.set_target_bytes(msg, line.into_bytes());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json_to_array"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    const DOCUMENT: &str = r#"{"foo":"value1","bar":2,"ok":true,"ratio":0.5,"nested":{"a":"x"},"list":[1]}"#;

    #[test]
    fn writes_fields_in_order() {
        struct TestCase {
            fields: Vec<&'static str>,
            separator: Option<&'static str>,
            expected: &'static str,
        }

        let cases = vec![
            TestCase {
                fields: vec!["foo", "bar"],
                separator: None,
                expected: "value1,2",
            },
            TestCase {
                fields: vec!["bar", "foo", "ok", "ratio"],
                separator: Some(" | "),
                expected: "2 | value1 | true | 0.5",
            },
            TestCase {
                fields: vec!["foo", "missing", "bar"],
                separator: None,
                expected: "value1,,2",
            },
            TestCase {
                fields: vec!["list", "nested", "nested/a"],
                separator: Some(";"),
                expected: ";;x",
            },
            TestCase {
                fields: vec![],
                separator: None,
                expected: "",
            },
        ];

        for case in cases {
            let mut cfg = ModulatorConfig::new("json_to_array").with_option("fields", case.fields.clone());
            if let Some(separator) = case.separator {
                cfg = cfg.with_option("separator", separator);
            }
            let mut msg = Message::new(DOCUMENT, StreamId::INVALID, 0);
            JsonToArrayFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();
            assert_eq!(msg.payload_str(), case.expected, "{:?}", case.fields);
        }
    }

    #[test]
    fn applies_to_metadata() {
        let cfg = ModulatorConfig::new("json_to_array")
            .with_apply_to("doc")
            .with_option("fields", vec!["foo", "bar"]);
        let mut msg = Message::new("PAYLOAD", StreamId::INVALID, 0);
        msg.metadata.set("doc", DOCUMENT);

        JsonToArrayFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert_eq!(msg.payload_str(), "PAYLOAD");
        assert_eq!(msg.metadata.get_string("doc").as_deref(), Some("value1,2"));
    }

    #[test]
    fn rejects_invalid_input() {
        let cfg = ModulatorConfig::new("json_to_array").with_option("fields", vec!["a"]);
        let formatter = JsonToArrayFormatter::from_config(&cfg).unwrap();
        for input in ["[1,2]", "not json", ""] {
            let mut msg = Message::new(input, StreamId::INVALID, 0);
            assert!(matches!(formatter.apply(&mut msg), Err(FormatError::Json(_))), "{}", input);
        }

        let unknown = ModulatorConfig::new("json_to_array").with_option("columns", vec!["a"]);
        assert!(JsonToArrayFormatter::from_config(&unknown).is_err());
    }
}
