// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stream identifiers and the process-wide stream name registry.
//!
//! A stream id is the 64-bit FNV-1a hash of the stream name, so the same name always
//! maps to the same id. Names are remembered on first use to allow the reverse lookup
//! needed by formatters that print the stream a message belongs to.

use std::collections::HashMap;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// Name of the stream used for internal log messages.
pub const LOG_INTERNAL_STREAM: &str = "_GOLLUM_";
/// Name of the stream that matches all streams.
pub const WILDCARD_STREAM: &str = "*";
/// Name of the stream that receives messages which could not be delivered.
pub const DROPPED_STREAM: &str = "_DROPPED_";

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a hash.
pub fn fnv1a64(data: &[u8]) -> u64 {
    data.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u64::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct StreamId(pub u64);

impl StreamId {
    pub const INVALID: StreamId = StreamId(0);

    /// Resolve (and register) the id for a stream name.
    pub fn of(name: &str) -> StreamId {
        let id = StreamId(fnv1a64(name.as_bytes()));
        let registry = registry();
        let known = registry
            .read()
            .map(|names| names.contains_key(&id))
            .unwrap_or(false);
        if !known {
            if let Ok(mut names) = registry.write() {
                names.entry(id).or_insert_with(|| name.to_string());
            }
        }
        id
    }

    pub fn wildcard() -> StreamId {
        StreamId::of(WILDCARD_STREAM)
    }

    pub fn dropped() -> StreamId {
        StreamId::of(DROPPED_STREAM)
    }

    pub fn log_internal() -> StreamId {
        StreamId::of(LOG_INTERNAL_STREAM)
    }

    /// Registered name for this id, or its decimal value when unknown.
    pub fn name(&self) -> String {
        stream_name(*self)
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn registry() -> &'static RwLock<HashMap<StreamId, String>> {
    static REGISTRY: OnceLock<RwLock<HashMap<StreamId, String>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Reverse lookup of a stream id.
pub fn stream_name(id: StreamId) -> String {
    if id == StreamId::INVALID {
        return String::new();
    }
    registry()
        .read()
        .ok()
        .and_then(|names| names.get(&id).cloned())
        .unwrap_or_else(|| id.0.to_string())
}
