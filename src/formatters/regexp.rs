// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use regex::bytes::Regex;
use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::Message;
use crate::traits::Formatter;

const DEFAULT_EXPRESSION: &str = "(.*)";
const DEFAULT_TEMPLATE: &str = "${1}";

/// Options for the `regexp` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegexpConfig {
    pub expression: String,
    /// Expansion template; `$1`, `${1}` and `${name}` refer to capture groups.
    pub template: String,
}

impl Default for RegexpConfig {
    fn default() -> Self {
        Self {
            expression: DEFAULT_EXPRESSION.to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Rewrites the content with the template, filled from the first match.
///
/// Content that does not match is left unchanged.
pub struct RegexpFormatter {
    content: Content,
    expression: Regex,
    template: Vec<u8>,
}

impl RegexpFormatter {
    pub fn new(content: Content, config: RegexpConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            content,
            expression: Regex::new(&config.expression)?,
            template: config.template.into_bytes(),
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for RegexpFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_bytes(msg);
        let Some(captures) = self.expression.captures(&data) else {
            return Ok(());
        };

        let mut expanded = Vec::with_capacity(data.len());
        captures.expand(&self.template, &mut expanded);
        self.content.set_target_bytes(msg, expanded);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "regexp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    #[test]
    fn expands_template_from_captures() {
        struct TestCase {
            expression: &'static str,
            template: Option<&'static str>,
            input: &'static str,
            expected: &'static str,
        }

        let cases = vec![
            TestCase {
                expression: "([a-z]*)",
                template: None,
                input: "test 123",
                expected: "test",
            },
            TestCase {
                expression: r"(\w+)=(\d+)",
                template: Some("$2:$1"),
                input: "count=17",
                expected: "17:count",
            },
            TestCase {
                expression: r"(?P<word>[a-z]+) (?P<num>\d+)",
                template: Some("${num}-${word}"),
                input: "test 123",
                expected: "123-test",
            },
            TestCase {
                expression: r"^\d+$",
                template: None,
                input: "no digits",
                expected: "no digits",
            },
        ];

        for case in cases {
            let mut cfg = ModulatorConfig::new("regexp").with_option("expression", case.expression);
            if let Some(template) = case.template {
                cfg = cfg.with_option("template", template);
            }
            let mut msg = Message::new(case.input, StreamId::INVALID, 0);
            RegexpFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();
            assert_eq!(msg.payload_str(), case.expected, "{}", case.expression);
        }
    }

    #[test]
    fn applies_to_metadata() {
        let cfg = ModulatorConfig::new("regexp")
            .with_apply_to("foo")
            .with_option("expression", "([a-z]*)");
        let mut msg = Message::new("PAYLOAD", StreamId::INVALID, 0);
        msg.metadata.set("foo", "test 123");
        RegexpFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert_eq!(msg.payload_str(), "PAYLOAD");
        assert_eq!(msg.metadata.get_string("foo").as_deref(), Some("test"));
    }

    #[test]
    fn invalid_expression_is_a_config_error() {
        let cfg = ModulatorConfig::new("regexp").with_option("expression", "([a-z");
        assert!(matches!(
            RegexpFormatter::from_config(&cfg),
            Err(ConfigError::Regex(_))
        ));
    }
}
