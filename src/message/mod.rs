// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The message model flowing through modulator pipelines.
//!
//! A [`Message`] carries a raw byte payload, a [`Metadata`] tree and the stream
//! bookkeeping used for routing. Formatters mutate messages in place; executors
//! clone them only where a formatter explicitly needs an independent copy.

mod metadata;
mod stream;
mod value;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};

use crate::errors::FormatError;

pub use metadata::{Metadata, PATH_SEPARATOR};
pub use stream::{
    fnv1a64, stream_name, StreamId, DROPPED_STREAM, LOG_INTERNAL_STREAM, WILDCARD_STREAM,
};
pub use value::Value;

const SERIALIZED_FIELDS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub payload: Vec<u8>,
    pub metadata: Metadata,
    pub stream_id: StreamId,
    pub prev_stream_id: StreamId,
    pub origin_stream_id: StreamId,
    pub timestamp: DateTime<Utc>,
    pub sequence: u64,
}

impl Message {
    pub fn new(payload: impl Into<Vec<u8>>, stream_id: StreamId, sequence: u64) -> Self {
        Self {
            payload: payload.into(),
            metadata: Metadata::new(),
            stream_id,
            prev_stream_id: stream_id,
            origin_stream_id: stream_id,
            timestamp: Utc::now(),
            sequence,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Route the message to a new stream, remembering the current one.
    pub fn set_stream_id(&mut self, stream_id: StreamId) {
        self.prev_stream_id = self.stream_id;
        self.stream_id = stream_id;
    }

    /// Deep copy used when a formatter runs nested modulators on an independent message.
    pub fn clone_message(&self) -> Message {
        self.clone()
    }

    pub fn payload_str(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Serialize the routing header and payload into a single text line.
    ///
    /// Format: `stream:prev_stream:unix_nanos:sequence:base64(payload)`.
    pub fn serialize(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.stream_id.0,
            self.prev_stream_id.0,
            self.timestamp.timestamp_nanos_opt().unwrap_or_default(),
            self.sequence,
            STANDARD.encode(&self.payload)
        )
    }

    /// Inverse of [`Message::serialize`]. Metadata is not part of the format.
    pub fn deserialize(data: &str) -> Result<Message, FormatError> {
        let fields: Vec<&str> = data.trim_end_matches(['\r', '\n']).split(':').collect();
        if fields.len() != SERIALIZED_FIELDS {
            return Err(FormatError::Parse(format!(
                "serialized message must have {} fields, found {}",
                SERIALIZED_FIELDS,
                fields.len()
            )));
        }

        let number = |field: &str, name: &str| {
            field
                .parse::<u64>()
                .map_err(|e| FormatError::Parse(format!("invalid {}: {}", name, e)))
        };
        let stream_id = StreamId(number(fields[0], "stream id")?);
        let prev_stream_id = StreamId(number(fields[1], "previous stream id")?);
        let nanos = fields[2]
            .parse::<i64>()
            .map_err(|e| FormatError::Parse(format!("invalid timestamp: {}", e)))?;
        let sequence = number(fields[3], "sequence")?;
        let payload = STANDARD.decode(fields[4])?;

        Ok(Message {
            payload,
            metadata: Metadata::new(),
            stream_id,
            prev_stream_id,
            origin_stream_id: stream_id,
            timestamp: Utc.timestamp_nanos(nanos),
            sequence,
        })
    }
}
