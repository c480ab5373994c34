// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Transition-table micro-parser.
//!
//! A [`TransitionParser`] scans a byte slice once, from left to right. Each state owns
//! a table of tokens; when the bytes at the current position start with one of the
//! current state's tokens, the matching [`Transition`] fires: its action (if any) is
//! handed the bytes read since the previous transition, the parser moves to the
//! transition's next state, and an explicit state stack can be pushed or popped.
//!
//! Tables are usually built from directive strings of the form
//! `State:Token:NextState:Flags:Function` (see [`TransitionDirective`]), which lets
//! formatters such as `text_to_json` describe a grammar entirely in configuration.
//!
//! # Example
//! ```
//! use the_modulator::parser::{TransitionFlags, TransitionParser};
//!
//! let mut parser: TransitionParser<&'static str> = TransitionParser::new();
//! parser.add("key", b"=", "value", TransitionFlags::NONE, Some("key"));
//! parser.add("value", b";", "key", TransitionFlags::NONE, Some("value"));
//!
//! let start = parser.state_id("key").unwrap();
//! let mut seen = Vec::new();
//! let (remains, _) = parser.parse(b"a=1;b=2", start, |action, data, _| {
//!     seen.push(format!("{}:{}", action, String::from_utf8_lossy(data)));
//! });
//!
//! assert_eq!(seen, vec!["key:a", "value:1", "key:b"]);
//! assert_eq!(remains, Some(&b"2"[..]));
//! ```

mod directive;
mod transition;

pub use directive::{split_fields, unescape, TransitionDirective};
pub use transition::{StateId, Transition, TransitionFlags, TransitionParser, STOP_STATE};
