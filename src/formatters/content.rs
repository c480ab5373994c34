// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Source/target addressing shared by all formatters.
//!
//! A [`Field`] is either the message payload or a metadata key (a `/` separated
//! path). A [`Content`] pairs the field a formatter reads from with the field it
//! writes to; both are configured per modulator via `source`, `target` and
//! `apply_to`.

use crate::errors::FormatError;
use crate::message::{Message, Metadata, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Payload,
    Metadata(String),
}

impl Field {
    /// An empty name addresses the payload.
    pub fn parse(name: &str) -> Field {
        if name.is_empty() {
            Field::Payload
        } else {
            Field::Metadata(name.to_string())
        }
    }

    pub fn is_metadata(&self) -> bool {
        matches!(self, Field::Metadata(_))
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Field::Payload => None,
            Field::Metadata(key) => Some(key),
        }
    }

    /// Raw bytes of the field. Missing metadata keys read as empty.
    pub fn get_bytes(&self, msg: &Message) -> Vec<u8> {
        match self {
            Field::Payload => msg.payload.clone(),
            Field::Metadata(key) => msg.metadata.get_bytes(key).unwrap_or_default(),
        }
    }

    pub fn get_string(&self, msg: &Message) -> String {
        match self {
            Field::Payload => msg.payload_str(),
            Field::Metadata(key) => msg.metadata.get_string(key).unwrap_or_default(),
        }
    }

    /// Typed value of the field. The payload is always `Value::Bytes`.
    pub fn get_value(&self, msg: &Message) -> Option<Value> {
        match self {
            Field::Payload => Some(Value::Bytes(msg.payload.clone())),
            Field::Metadata(key) => msg.metadata.get(key).cloned(),
        }
    }

    pub fn set_bytes(&self, msg: &mut Message, data: Vec<u8>) {
        match self {
            Field::Payload => msg.payload = data,
            Field::Metadata(key) => msg.metadata.set(key, Value::Bytes(data)),
        }
    }

    pub fn set_value(&self, msg: &mut Message, value: Value) {
        match self {
            Field::Payload => msg.payload = value.as_bytes(),
            Field::Metadata(key) => msg.metadata.set(key, value),
        }
    }

    /// Empty the payload, or delete the metadata key.
    pub fn clear(&self, msg: &mut Message) {
        match self {
            Field::Payload => msg.payload.clear(),
            Field::Metadata(key) => {
                msg.metadata.remove(key);
            }
        }
    }

    /// Metadata map to write structured results into.
    ///
    /// For the payload this is the message's metadata root; for a key it is the map
    /// stored at that key, created (or replacing a scalar) when needed.
    pub fn force_metadata<'m>(&self, msg: &'m mut Message) -> &'m mut Metadata {
        match self {
            Field::Payload => &mut msg.metadata,
            Field::Metadata(key) => msg.metadata.force_map(key),
        }
    }

    /// Read the field as a metadata map.
    ///
    /// The payload is parsed as a JSON object (an empty payload is an empty map); a
    /// metadata key must hold a map (a missing key is an empty map).
    pub fn get_metadata(&self, msg: &Message) -> Result<Metadata, FormatError> {
        match self {
            Field::Payload => {
                if msg.payload.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Metadata::new());
                }
                let obj: serde_json::Map<String, serde_json::Value> =
                    serde_json::from_slice(&msg.payload)?;
                Ok(Metadata::from(obj))
            }
            Field::Metadata(key) => match msg.metadata.get(key) {
                None => Ok(Metadata::new()),
                Some(Value::Map(map)) => Ok(map.clone()),
                Some(_) => Err(FormatError::Parse(format!("metadata key '{}' is not a map", key))),
            },
        }
    }
}

/// The fields a formatter reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub source: Field,
    pub target: Field,
}

impl Default for Content {
    fn default() -> Self {
        Self {
            source: Field::Payload,
            target: Field::Payload,
        }
    }
}

impl Content {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: Field::parse(source),
            target: Field::parse(target),
        }
    }

    /// Read from and write to the same field.
    pub fn applied_to(field: &str) -> Self {
        Self::new(field, field)
    }

    pub fn source_bytes(&self, msg: &Message) -> Vec<u8> {
        self.source.get_bytes(msg)
    }

    pub fn source_string(&self, msg: &Message) -> String {
        self.source.get_string(msg)
    }

    pub fn set_target_bytes(&self, msg: &mut Message, data: Vec<u8>) {
        self.target.set_bytes(msg, data)
    }

    pub fn set_target_value(&self, msg: &mut Message, value: Value) {
        self.target.set_value(msg, value)
    }

    pub fn target_metadata<'m>(&self, msg: &'m mut Message) -> &'m mut Metadata {
        self.target.force_metadata(msg)
    }

    pub fn source_metadata(&self, msg: &Message) -> Result<Metadata, FormatError> {
        self.source.get_metadata(msg)
    }

    /// Fail with `NotMetadata` unless the source addresses a metadata key.
    pub fn require_metadata_source(&self, formatter: &'static str) -> Result<&str, FormatError> {
        self.source.key().ok_or(FormatError::NotMetadata {
            formatter,
            field: "source",
        })
    }

    /// Fail with `NotMetadata` unless the target addresses a metadata key.
    pub fn require_metadata_target(&self, formatter: &'static str) -> Result<&str, FormatError> {
        self.target.key().ok_or(FormatError::NotMetadata {
            formatter,
            field: "target",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    fn message() -> Message {
        let mut msg = Message::new("payload", StreamId::INVALID, 0);
        msg.metadata.set("key", "value");
        msg.metadata.set("num", 7i64);
        msg
    }

    #[test]
    fn fields_read_payload_and_metadata() {
        let msg = message();
        assert_eq!(Field::parse("").get_bytes(&msg), b"payload");
        assert_eq!(Field::parse("key").get_bytes(&msg), b"value");
        assert_eq!(Field::parse("num").get_string(&msg), "7");
        assert_eq!(Field::parse("missing").get_bytes(&msg), b"");
        assert_eq!(Field::parse("missing").get_value(&msg), None);
    }

    #[test]
    fn set_value_on_payload_renders_bytes() {
        let mut msg = message();
        Field::Payload.set_value(&mut msg, Value::Int(12));
        assert_eq!(msg.payload, b"12");
    }

    #[test]
    fn clear_removes_metadata_key() {
        let mut msg = message();
        Field::parse("key").clear(&mut msg);
        assert!(!msg.metadata.contains("key"));
        Field::Payload.clear(&mut msg);
        assert!(msg.payload.is_empty());
    }

    #[test]
    fn force_metadata_replaces_scalars() {
        let mut msg = message();
        Field::parse("key").force_metadata(&mut msg).set("child", "x");
        assert_eq!(msg.metadata.get_string("key/child").as_deref(), Some("x"));
    }

    #[test]
    fn payload_as_metadata_parses_json_objects() {
        let mut msg = Message::new(r#"{"a":{"b":1}}"#, StreamId::INVALID, 0);
        let map = Field::Payload.get_metadata(&msg).unwrap();
        assert_eq!(map.get("a/b"), Some(&Value::Int(1)));

        msg.payload = b"[1,2]".to_vec();
        assert!(Field::Payload.get_metadata(&msg).is_err());

        msg.payload.clear();
        assert!(Field::Payload.get_metadata(&msg).unwrap().is_empty());
    }

    #[test]
    fn require_metadata_reports_field() {
        let content = Content::new("", "dest");
        assert!(matches!(
            content.require_metadata_source("split"),
            Err(FormatError::NotMetadata { field: "source", .. })
        ));
        assert_eq!(content.require_metadata_target("split").unwrap(), "dest");
    }
}
