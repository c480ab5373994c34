// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::message::Message;

/// Result of running a modulator on a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModulateResult {
    /// Pass the message on to the next modulator.
    Continue,
    /// Stop processing and route the message to the fallback stream.
    Fallback,
    /// Stop processing and drop the message.
    Discard,
}

impl fmt::Display for ModulateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModulateResult::Continue => "continue",
            ModulateResult::Fallback => "fallback",
            ModulateResult::Discard => "discard",
        };
        write!(f, "{}", name)
    }
}

/// A pipeline step that decides what happens to a message.
pub trait Modulator: Send + Sync {
    fn modulate(&self, msg: &mut Message) -> ModulateResult;
}
