// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::ops::BitOr;

/// Interned parser state.
pub type StateId = u32;

/// Reaching this state ends parsing. An empty state name maps to it.
pub const STOP_STATE: StateId = u32::MAX;

/// Behaviour modifiers of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionFlags(u8);

impl TransitionFlags {
    pub const NONE: TransitionFlags = TransitionFlags(0);
    /// Do not skip the token; it becomes the start of the next read.
    pub const CONTINUE: TransitionFlags = TransitionFlags(1);
    /// Keep the current read buffer instead of starting a new one.
    pub const APPEND: TransitionFlags = TransitionFlags(1 << 1);
    /// Hand the token to the action together with the data read before it.
    pub const INCLUDE: TransitionFlags = TransitionFlags(1 << 2);
    /// Push the current state before moving on.
    pub const PUSH: TransitionFlags = TransitionFlags(1 << 3);
    /// Return to the last pushed state instead of the configured next state.
    pub const POP: TransitionFlags = TransitionFlags(1 << 4);

    pub fn contains(self, other: TransitionFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse a single flag name as used in directives.
    pub fn from_name(name: &str) -> Option<TransitionFlags> {
        match name.to_ascii_lowercase().as_str() {
            "continue" => Some(Self::CONTINUE),
            "append" => Some(Self::APPEND),
            "include" => Some(Self::INCLUDE),
            "push" => Some(Self::PUSH),
            "pop" => Some(Self::POP),
            _ => None,
        }
    }
}

impl BitOr for TransitionFlags {
    type Output = TransitionFlags;

    fn bitor(self, rhs: TransitionFlags) -> TransitionFlags {
        TransitionFlags(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone)]
pub struct Transition<A> {
    pub next_state: StateId,
    pub flags: TransitionFlags,
    pub action: Option<A>,
}

/// Table driven single pass scanner. See the module documentation.
#[derive(Debug, Clone)]
pub struct TransitionParser<A> {
    names: Vec<String>,
    ids: HashMap<String, StateId>,
    // Per state, ordered by descending token length so the longest token wins.
    tables: Vec<Vec<(Vec<u8>, Transition<A>)>>,
}

impl<A> Default for TransitionParser<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TransitionParser<A> {
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            ids: HashMap::new(),
            tables: Vec::new(),
        }
    }

    /// Id of an already known state. The empty name is [`STOP_STATE`].
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        if name.is_empty() {
            return Some(STOP_STATE);
        }
        self.ids.get(name).copied()
    }

    pub fn state_name(&self, id: StateId) -> &str {
        self.names.get(id as usize).map(String::as_str).unwrap_or("")
    }

    pub fn state_count(&self) -> usize {
        self.names.len()
    }

    fn intern(&mut self, name: &str) -> StateId {
        if name.is_empty() {
            return STOP_STATE;
        }
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = self.names.len() as StateId;
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        self.tables.push(Vec::new());
        id
    }

    /// Register a transition. A later transition for the same state and token
    /// replaces the earlier one.
    pub fn add(
        &mut self,
        state: &str,
        token: &[u8],
        next_state: &str,
        flags: TransitionFlags,
        action: Option<A>,
    ) {
        let from = self.intern(state);
        let next_state = self.intern(next_state);
        if from == STOP_STATE {
            return;
        }

        let table = &mut self.tables[from as usize];
        table.retain(|(existing, _)| existing.as_slice() != token);
        let position = table
            .iter()
            .position(|(existing, _)| existing.len() < token.len())
            .unwrap_or(table.len());
        table.insert(
            position,
            (
                token.to_vec(),
                Transition {
                    next_state,
                    flags,
                    action,
                },
            ),
        );
    }

    fn match_at(&self, state: StateId, data: &[u8]) -> Option<(&[u8], &Transition<A>)> {
        self.tables
            .get(state as usize)?
            .iter()
            .find(|(token, _)| data.starts_with(token))
            .map(|(token, transition)| (token.as_slice(), transition))
    }

    /// Scan `data` starting in `start`.
    ///
    /// `handler` receives the action of each firing transition, the bytes read since
    /// the previous transition and the state the transition fired in. Returns the
    /// unread tail of `data` (`None` if everything was consumed) and the state the
    /// parser ended in.
    pub fn parse<'d, F>(&self, data: &'d [u8], start: StateId, mut handler: F) -> (Option<&'d [u8]>, StateId)
    where
        F: FnMut(&A, &[u8], StateId),
    {
        let mut stack: Vec<StateId> = Vec::new();
        let mut state = start;
        let mut read_start = 0;
        let mut idx = 0;

        while idx < data.len() && state != STOP_STATE {
            let (token, transition) = match self.match_at(state, &data[idx..]) {
                Some(found) => found,
                None => {
                    idx += 1;
                    continue;
                }
            };

            if let Some(action) = &transition.action {
                let end = if transition.flags.contains(TransitionFlags::INCLUDE) {
                    idx + token.len()
                } else {
                    idx
                };
                handler(action, &data[read_start.min(end)..end], state);
            }

            let continue_at = if transition.flags.contains(TransitionFlags::CONTINUE) {
                idx
            } else {
                idx + token.len()
            };
            if !transition.flags.contains(TransitionFlags::APPEND) {
                read_start = continue_at;
            }

            let mut next = transition.next_state;
            if transition.flags.contains(TransitionFlags::POP) {
                if let Some(popped) = stack.pop() {
                    next = popped;
                }
            }
            if transition.flags.contains(TransitionFlags::PUSH) {
                stack.push(state);
            }

            state = next;
            idx = if transition.flags.contains(TransitionFlags::CONTINUE) {
                idx + 1
            } else {
                idx + token.len().max(1)
            };
        }

        let remains = if read_start >= data.len() {
            None
        } else {
            Some(&data[read_start..])
        };
        (remains, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(parser: &TransitionParser<&'static str>, start: &str, data: &[u8]) -> (Vec<String>, Option<String>, String) {
        let mut events = Vec::new();
        let start = parser.state_id(start).unwrap();
        let (remains, last) = parser.parse(data, start, |action, bytes, _| {
            events.push(format!("{}={}", action, String::from_utf8_lossy(bytes)));
        });
        (
            events,
            remains.map(|r| String::from_utf8_lossy(r).into_owned()),
            parser.state_name(last).to_string(),
        )
    }

    #[test]
    fn longest_token_wins() {
        let mut parser = TransitionParser::new();
        parser.add("s", b"-", "s", TransitionFlags::NONE, Some("short"));
        parser.add("s", b"--", "s", TransitionFlags::NONE, Some("long"));

        let (events, remains, _) = collect(&parser, "s", b"a--b-c");
        assert_eq!(events, vec!["long=a", "short=b"]);
        assert_eq!(remains.as_deref(), Some("c"));
    }

    #[test]
    fn include_hands_token_to_action() {
        let mut parser = TransitionParser::new();
        parser.add("s", b";", "s", TransitionFlags::INCLUDE, Some("item"));

        let (events, remains, _) = collect(&parser, "s", b"a;b;");
        assert_eq!(events, vec!["item=a;", "item=b;"]);
        assert_eq!(remains, None);
    }

    #[test]
    fn append_keeps_read_buffer() {
        let mut parser = TransitionParser::new();
        parser.add("s", b",", "t", TransitionFlags::APPEND, None);
        parser.add("t", b";", "s", TransitionFlags::NONE, Some("pair"));

        let (events, _, _) = collect(&parser, "s", b"a,b;");
        assert_eq!(events, vec!["pair=a,b"]);
    }

    #[test]
    fn continue_prepends_token_to_next_read() {
        let mut parser = TransitionParser::new();
        parser.add("text", b"#", "tag", TransitionFlags::CONTINUE, Some("text"));
        parser.add("tag", b" ", "text", TransitionFlags::NONE, Some("tag"));

        let (events, remains, _) = collect(&parser, "text", b"hello #rust rocks");
        assert_eq!(events, vec!["text=hello ", "tag=#rust"]);
        assert_eq!(remains.as_deref(), Some("rocks"));
    }

    #[test]
    fn pop_returns_to_pushed_state() {
        let mut parser = TransitionParser::new();
        parser.add("outer", b"(", "inner", TransitionFlags::PUSH, Some("open"));
        parser.add("inner", b")", "", TransitionFlags::POP, Some("close"));
        parser.add("outer", b".", "", TransitionFlags::NONE, Some("done"));

        let (events, remains, last) = collect(&parser, "outer", b"a(b)c.rest");
        assert_eq!(events, vec!["open=a", "close=b", "done=c"]);
        assert_eq!(remains.as_deref(), Some("rest"));
        assert_eq!(last, "");
    }

    #[test]
    fn pop_on_empty_stack_uses_next_state() {
        let mut parser = TransitionParser::new();
        parser.add("a", b"|", "b", TransitionFlags::POP, None);

        let (_, _, last) = collect(&parser, "a", b"x|y");
        assert_eq!(last, "b");
    }

    #[test]
    fn stop_state_ends_parsing() {
        let mut parser = TransitionParser::new();
        parser.add("s", b"!", "", TransitionFlags::NONE, Some("stop"));
        parser.add("s", b";", "s", TransitionFlags::NONE, Some("never"));

        let (events, remains, _) = collect(&parser, "s", b"a!b;c");
        assert_eq!(events, vec!["stop=a"]);
        assert_eq!(remains.as_deref(), Some("b;c"));
    }

    #[test]
    fn state_names_are_interned() {
        let mut parser: TransitionParser<()> = TransitionParser::new();
        parser.add("a", b"x", "b", TransitionFlags::NONE, None);
        parser.add("b", b"y", "a", TransitionFlags::NONE, None);

        assert_eq!(parser.state_count(), 2);
        assert_eq!(parser.state_id(""), Some(STOP_STATE));
        assert_eq!(parser.state_name(parser.state_id("b").unwrap()), "b");
        assert_eq!(parser.state_id("missing"), None);
    }

    #[test]
    fn flags_parse_by_name() {
        assert_eq!(TransitionFlags::from_name("Push"), Some(TransitionFlags::PUSH));
        assert!(TransitionFlags::from_name("jump").is_none());
        let combined = TransitionFlags::PUSH | TransitionFlags::INCLUDE;
        assert!(combined.contains(TransitionFlags::PUSH));
        assert!(!combined.contains(TransitionFlags::POP));
    }
}
