// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Grok pattern matching.
//!
//! A grok pattern is a regular expression that may reference named library
//! patterns:
//!
//! * `%{NAME}` inlines the pattern without capturing it;
//! * `%{NAME:field}` captures the match as `field`;
//! * `%{NAME:field:type}` is accepted for compatibility, the type is ignored and
//!   captures are always strings.
//!
//! Plain `(?P<field>...)` groups capture as well. With `named_captures_only`
//! disabled, a top level `%{NAME}` also captures, keyed by the pattern name.
//! References are expanded recursively before the expression is compiled with
//! the `regex` crate, so the library avoids look-around and back-references.

use std::collections::HashSet;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::{Message, Value};
use crate::traits::Formatter;

const REFERENCE: &str = r"%\{(\w+)(?::([\w\-.@\[\]]+))?(?::(\w+))?\}";
const MAX_EXPANSION_DEPTH: usize = 32;

const LIBRARY: &[(&str, &str)] = &[
    ("USERNAME", r"[a-zA-Z0-9._-]+"),
    ("USER", r"%{USERNAME}"),
    ("EMAILLOCALPART", r"[a-zA-Z][a-zA-Z0-9_.+-=:]+"),
    ("EMAILADDRESS", r"%{EMAILLOCALPART}@%{HOSTNAME}"),
    ("INT", r"(?:[+-]?(?:[0-9]+))"),
    ("BASE10NUM", r"(?:[+-]?(?:[0-9]+(?:\.[0-9]+)?|\.[0-9]+))"),
    ("NUMBER", r"(?:%{BASE10NUM})"),
    ("BASE16NUM", r"(?:[+-]?(?:0x)?(?:[0-9A-Fa-f]+))"),
    ("POSINT", r"\b(?:[1-9][0-9]*)\b"),
    ("NONNEGINT", r"\b(?:[0-9]+)\b"),
    ("WORD", r"\b\w+\b"),
    ("NOTSPACE", r"\S+"),
    ("SPACE", r"\s*"),
    ("DATA", r".*?"),
    ("GREEDYDATA", r".*"),
    ("QUOTEDSTRING", r#"(?:"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|`(?:[^`\\]|\\.)*`)"#),
    ("UUID", r"[A-Fa-f0-9]{8}-(?:[A-Fa-f0-9]{4}-){3}[A-Fa-f0-9]{12}"),
    ("MAC", r"(?:[A-Fa-f0-9]{2}[:.-]){5}[A-Fa-f0-9]{2}"),
    ("IPV4", r"(?:(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])"),
    ("IPV6", r"(?:[0-9A-Fa-f]{0,4}:){2,7}[0-9A-Fa-f]{0,4}"),
    ("IP", r"(?:%{IPV6}|%{IPV4})"),
    ("HOSTNAME", r"\b(?:[0-9A-Za-z][0-9A-Za-z-]{0,62})(?:\.(?:[0-9A-Za-z][0-9A-Za-z-]{0,62}))*\.?"),
    ("IPORHOST", r"(?:%{IP}|%{HOSTNAME})"),
    ("HOSTPORT", r"%{IPORHOST}:%{POSINT}"),
    ("UNIXPATH", r"(?:/[\w_%!$@:.,~-]*)+"),
    ("WINPATH", r"(?:[A-Za-z]+:|\\)(?:\\[^\\?*]*)+"),
    ("PATH", r"(?:%{UNIXPATH}|%{WINPATH})"),
    ("URIPROTO", r"[A-Za-z]+(?:\+[A-Za-z+]+)?"),
    ("URIHOST", r"%{IPORHOST}(?::%{POSINT})?"),
    ("URIPATH", r"(?:/[A-Za-z0-9$.+!*'(){},~:;=@#%_\-]*)+"),
    ("URIPARAM", r"\?[A-Za-z0-9$.+!*'|(){},~@#%&/=:;_?\-\[\]<>]*"),
    ("URIPATHPARAM", r"%{URIPATH}(?:%{URIPARAM})?"),
    ("URI", r"%{URIPROTO}://(?:%{USER}(?::[^@]*)?@)?(?:%{URIHOST})?(?:%{URIPATHPARAM})?"),
    ("MONTH", r"\b(?:Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\b"),
    ("MONTHNUM", r"(?:0?[1-9]|1[0-2])"),
    ("MONTHDAY", r"(?:(?:0[1-9])|(?:[12][0-9])|(?:3[01])|[1-9])"),
    ("DAY", r"(?:Mon(?:day)?|Tue(?:sday)?|Wed(?:nesday)?|Thu(?:rsday)?|Fri(?:day)?|Sat(?:urday)?|Sun(?:day)?)"),
    ("YEAR", r"(?:\d\d){1,2}"),
    ("HOUR", r"(?:2[0123]|[01]?[0-9])"),
    ("MINUTE", r"(?:[0-5][0-9])"),
    ("SECOND", r"(?:(?:[0-5]?[0-9]|60)(?:[:.,][0-9]+)?)"),
    ("TIME", r"%{HOUR}:%{MINUTE}(?::%{SECOND})?"),
    ("ISO8601_TIMEZONE", r"(?:Z|[+-]%{HOUR}(?::?%{MINUTE}))"),
    ("TIMESTAMP_ISO8601", r"%{YEAR}-%{MONTHNUM}-%{MONTHDAY}[T ]%{HOUR}:?%{MINUTE}(?::?%{SECOND})?%{ISO8601_TIMEZONE}?"),
    ("HTTPDATE", r"%{MONTHDAY}/%{MONTH}/%{YEAR}:%{TIME} %{INT}"),
    ("SYSLOGTIMESTAMP", r"%{MONTH} +%{MONTHDAY} %{TIME}"),
    ("LOGLEVEL", r"(?:[Aa]lert|ALERT|[Tt]race|TRACE|[Dd]ebug|DEBUG|[Nn]otice|NOTICE|[Ii]nfo|INFO|[Ww]arn?(?:ing)?|WARN?(?:ING)?|[Ee]rr?(?:or)?|ERR?(?:OR)?|[Cc]rit?(?:ical)?|CRIT?(?:ICAL)?|[Ff]atal|FATAL|[Ss]evere|SEVERE|EMERG(?:ENCY)?|[Ee]merg(?:ency)?)"),
    ("QS", r"%{QUOTEDSTRING}"),
    ("COMMONAPACHELOG", r#"%{IPORHOST:clientip} %{USER:ident} %{USER:auth} \[%{HTTPDATE:timestamp}\] "(?:%{WORD:verb} %{NOTSPACE:request}(?: HTTP/%{NUMBER:httpversion})?|%{DATA:rawrequest})" %{NUMBER:response} (?:%{NUMBER:bytes}|-)"#),
    ("COMBINEDAPACHELOG", r"%{COMMONAPACHELOG} %{QS:referrer} %{QS:agent}"),
];

/// Options shared by the `grok` and `grok_to_json` formatters
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrokConfig {
    /// Tried in order; the first pattern producing values wins.
    pub patterns: Vec<String>,
    pub remove_empty_values: bool,
    pub named_captures_only: bool,
    /// Disables the built-in pattern library; every `%{NAME}` is then unknown.
    pub skip_default_patterns: bool,
}

impl Default for GrokConfig {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            remove_empty_values: true,
            named_captures_only: true,
            skip_default_patterns: false,
        }
    }
}

struct Expander {
    reference: Regex,
    capture_bare: bool,
    use_library: bool,
}

/// A list of compiled grok patterns.
#[derive(Debug)]
pub struct GrokParser {
    expressions: Vec<Regex>,
    remove_empty_values: bool,
}

impl GrokParser {
    pub fn new(config: &GrokConfig) -> Result<Self, ConfigError> {
        let expander = Expander {
            reference: Regex::new(REFERENCE)?,
            capture_bare: !config.named_captures_only,
            use_library: !config.skip_default_patterns,
        };
        let expressions = config
            .patterns
            .iter()
            .map(|pattern| {
                let mut bare = HashSet::new();
                let expanded = expander.expand(pattern, 0, &mut bare)?;
                Ok(Regex::new(&expanded)?)
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self {
            expressions,
            remove_empty_values: config.remove_empty_values,
        })
    }

    /// Named captures of the first pattern that yields at least one value.
    pub fn parse(&self, text: &str) -> Option<IndexMap<String, String>> {
        self.expressions.iter().find_map(|expression| {
            let captures = expression.captures(text)?;
            let values: IndexMap<String, String> = expression
                .capture_names()
                .flatten()
                .filter_map(|name| {
                    let value = captures.name(name)?.as_str();
                    if self.remove_empty_values && value.is_empty() {
                        return None;
                    }
                    Some((name.to_string(), value.to_string()))
                })
                .collect();
            (!values.is_empty()).then_some(values)
        })
    }
}

fn library_pattern(name: &str) -> Option<&'static str> {
    LIBRARY
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, pattern)| *pattern)
}

impl Expander {
    /// `bare` holds the pattern names already captured by a bare reference;
    /// a repeated name is inlined without capturing.
    fn expand(&self, pattern: &str, depth: usize, bare: &mut HashSet<String>) -> Result<String, ConfigError> {
        if depth > MAX_EXPANSION_DEPTH {
            return Err(ConfigError::invalid_options(
                "grok",
                format!("pattern references nest too deep in '{}'", pattern),
            ));
        }

        let mut expanded = String::with_capacity(pattern.len());
        let mut last = 0;
        for captures in self.reference.captures_iter(pattern) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let name = name.as_str();
            let body = self
                .use_library
                .then(|| library_pattern(name))
                .flatten()
                .ok_or_else(|| ConfigError::invalid_options("grok", format!("unknown pattern '{}'", name)))?;
            let body = self.expand(body, depth + 1, bare)?;

            expanded.push_str(&pattern[last..whole.start()]);
            match captures.get(2) {
                Some(field) => {
                    expanded.push_str(&format!("(?P<{}>{})", field.as_str(), body));
                }
                None if self.capture_bare && depth == 0 && bare.insert(name.to_string()) => {
                    expanded.push_str(&format!("(?P<{}>{})", name, body));
                }
                None => expanded.push_str(&format!("(?:{})", body)),
            }
            last = whole.end();
        }
        expanded.push_str(&pattern[last..]);
        Ok(expanded)
    }
}

/// Stores the captures of the first matching grok pattern in the target metadata.
pub struct GrokFormatter {
    content: Content,
    parser: GrokParser,
}

impl GrokFormatter {
    pub fn new(content: Content, config: GrokConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            content,
            parser: GrokParser::new(&config)?,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for GrokFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let text = self.content.source_string(msg);
        let values = self
            .parser
            .parse(&text)
            .ok_or(FormatError::NoPatternMatched(text))?;

        let target = self.content.target_metadata(msg);
        for (key, value) in values {
            target.set(&key, Value::String(value));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "grok"
    }
}

/// Replaces the content with the captures of the first matching grok pattern,
/// serialized as a JSON object.
pub struct GrokToJsonFormatter {
    content: Content,
    parser: GrokParser,
}

impl GrokToJsonFormatter {
    pub fn new(content: Content, config: GrokConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            content,
            parser: GrokParser::new(&config)?,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for GrokToJsonFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let text = self.content.source_string(msg);
        let values = self
            .parser
            .parse(&text)
            .ok_or(FormatError::NoPatternMatched(text))?;
        self.content.set_target_bytes(msg, serde_json::to_vec(&values)?);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "grok_to_json"
    }
}
