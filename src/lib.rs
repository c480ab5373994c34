// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // config loading + validation
pub mod engine;     // modulator arrays and executors
pub mod errors;     // error handling
pub mod formatters; // the formatter catalogue
pub mod message;    // messages, metadata, streams
pub mod observability;
pub mod parser;     // state machine text parser
pub mod traits;     // unified abstractions
