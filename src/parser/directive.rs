// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::ConfigError;
use crate::parser::{TransitionFlags, TransitionParser};

const MIN_FIELDS: usize = 3;
const MAX_FIELDS: usize = 5;

/// A parsed `State:Token:NextState:Flags:Function` directive.
///
/// * `\:` escapes a colon inside any field.
/// * Spaces are removed from every field except `Token`.
/// * `Token` additionally understands `\n`, `\r` and `\t`.
/// * `Flags` is a comma separated list of `continue`, `append`, `include`, `push`
///   and `pop`.
/// * An empty `NextState` stops the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionDirective {
    pub state: String,
    pub token: Vec<u8>,
    pub next_state: String,
    pub flags: TransitionFlags,
    pub function: String,
}

impl TransitionDirective {
    pub fn parse(directive: &str) -> Result<Self, ConfigError> {
        let fields = split_fields(directive);
        if fields.len() < MIN_FIELDS || fields.len() > MAX_FIELDS {
            return Err(ConfigError::invalid_directive(
                directive,
                format!(
                    "expected {} to {} ':' separated fields, found {}",
                    MIN_FIELDS,
                    MAX_FIELDS,
                    fields.len()
                ),
            ));
        }

        let strip = |field: &str| field.replace(' ', "");
        let token = unescape(&fields[1]);
        if token.is_empty() {
            return Err(ConfigError::invalid_directive(directive, "token must not be empty"));
        }

        let mut flags = TransitionFlags::NONE;
        if let Some(raw_flags) = fields.get(3) {
            for name in strip(raw_flags).split(',').filter(|n| !n.is_empty()) {
                let flag = TransitionFlags::from_name(name).ok_or_else(|| {
                    ConfigError::invalid_directive(directive, format!("unknown flag '{}'", name))
                })?;
                flags = flags | flag;
            }
        }

        Ok(Self {
            state: strip(&fields[0]),
            token: token.into_bytes(),
            next_state: strip(&fields[2]),
            flags,
            function: fields.get(4).map(|f| strip(f)).unwrap_or_default(),
        })
    }

    /// Parse a list of directives and register them with `parser`.
    ///
    /// `resolve` maps a function name to the parser action. An empty name means the
    /// transition has no action.
    pub fn load_all<A, R>(
        directives: &[String],
        parser: &mut TransitionParser<A>,
        mut resolve: R,
    ) -> Result<(), ConfigError>
    where
        R: FnMut(&str) -> Option<A>,
    {
        for raw in directives {
            let directive = Self::parse(raw)?;
            let action = if directive.function.is_empty() {
                None
            } else {
                Some(resolve(&directive.function).ok_or_else(|| {
                    ConfigError::invalid_directive(
                        raw,
                        format!("unknown function '{}'", directive.function),
                    )
                })?)
            };
            parser.add(
                &directive.state,
                &directive.token,
                &directive.next_state,
                directive.flags,
                action,
            );
        }
        Ok(())
    }
}

/// Split a directive at `:`, keeping colons escaped as `\:`.
pub fn split_fields(directive: &str) -> Vec<String> {
    let mut fields = vec![String::new()];
    let mut chars = directive.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&':') => {
                chars.next();
                push_char(&mut fields, ':');
            }
            ':' => fields.push(String::new()),
            other => push_char(&mut fields, other),
        }
    }
    fields
}

fn push_char(fields: &mut [String], c: char) {
    if let Some(last) = fields.last_mut() {
        last.push(c);
    }
}

/// Replace `\n`, `\r` and `\t` escape sequences with their control characters.
pub fn unescape(value: &str) -> String {
    value
        .replace("\\n", "\n")
        .replace("\\r", "\r")
        .replace("\\t", "\t")
}
