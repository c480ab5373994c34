// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Formatters that read or change the stream a message is routed to.

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::{Content, NoOptions};
use crate::message::{stream_name, Message, StreamId};
use crate::traits::Formatter;

const DEFAULT_STREAM_NAME_SEPARATOR: &str = " ";
const DEFAULT_STREAM_ROUTE_DELIMITER: &str = ":";

/// Options for the `stream_name` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamNameConfig {
    /// Print the stream the message was routed from instead of the current one.
    pub use_previous_stream: bool,
    pub separator: String,
}

impl Default for StreamNameConfig {
    fn default() -> Self {
        Self {
            use_previous_stream: false,
            separator: DEFAULT_STREAM_NAME_SEPARATOR.to_string(),
        }
    }
}

/// Prefixes the content with the name of the message's stream.
pub struct StreamNameFormatter {
    content: Content,
    config: StreamNameConfig,
}

impl StreamNameFormatter {
    pub fn new(content: Content, config: StreamNameConfig) -> Self {
        Self { content, config }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }
}

impl Formatter for StreamNameFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let stream = if self.config.use_previous_stream {
            msg.prev_stream_id
        } else {
            msg.stream_id
        };

        let mut data = stream_name(stream).into_bytes();
        data.extend_from_slice(self.config.separator.as_bytes());
        data.extend_from_slice(&self.content.source_bytes(msg));
        self.content.set_target_bytes(msg, data);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stream_name"
    }
}

/// Options for the `stream_route` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamRouteConfig {
    pub delimiter: String,
}

impl Default for StreamRouteConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_STREAM_ROUTE_DELIMITER.to_string(),
        }
    }
}

/// Routes `stream:data` content to `stream` and strips the prefix.
///
/// A prefix containing a space is treated as data and left alone. Content starting
/// with the delimiter only loses the delimiter.
pub struct StreamRouteFormatter {
    content: Content,
    delimiter: Vec<u8>,
}

impl StreamRouteFormatter {
    pub fn new(content: Content, config: StreamRouteConfig) -> Result<Self, ConfigError> {
        if config.delimiter.is_empty() {
            return Err(ConfigError::invalid_options(
                "stream_route",
                "delimiter must not be empty",
            ));
        }
        Ok(Self {
            content,
            delimiter: config.delimiter.into_bytes(),
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for StreamRouteFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let data = self.content.source_bytes(msg);
        let Some(prefix_end) = data
            .windows(self.delimiter.len())
            .position(|window| window == self.delimiter.as_slice())
        else {
            return Ok(());
        };

        let rest = data[prefix_end + self.delimiter.len()..].to_vec();
        if prefix_end == 0 {
            self.content.set_target_bytes(msg, rest);
            return Ok(());
        }

        let prefix = &data[..prefix_end];
        if prefix.contains(&b' ') {
            return Ok(());
        }

        let stream = StreamId::of(&String::from_utf8_lossy(prefix));
        msg.set_stream_id(stream);
        self.content.set_target_bytes(msg, rest);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stream_route"
    }
}

/// Sends the message back to the stream it was routed from.
pub struct StreamRevertFormatter;

impl StreamRevertFormatter {
    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        cfg.options_as::<NoOptions>()?;
        Ok(Self)
    }
}

impl Formatter for StreamRevertFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        msg.set_stream_id(msg.prev_stream_id);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stream_revert"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{DROPPED_STREAM, LOG_INTERNAL_STREAM};

    #[test]
    fn stream_name_prefixes_current_or_previous_stream() {
        struct TestCase {
            use_previous_stream: bool,
            separator: Option<&'static str>,
            expected: String,
        }

        let cases = vec![
            TestCase {
                use_previous_stream: false,
                separator: None,
                expected: format!("{} test", DROPPED_STREAM),
            },
            TestCase {
                use_previous_stream: true,
                separator: None,
                expected: format!("{} test", LOG_INTERNAL_STREAM),
            },
            TestCase {
                use_previous_stream: false,
                separator: Some(": "),
                expected: format!("{}: test", DROPPED_STREAM),
            },
        ];

        for case in cases {
            let mut cfg = ModulatorConfig::new("stream_name")
                .with_option("use_previous_stream", case.use_previous_stream);
            if let Some(separator) = case.separator {
                cfg = cfg.with_option("separator", separator);
            }
            let mut msg = Message::new("test", StreamId::log_internal(), 0);
            msg.set_stream_id(StreamId::dropped());

            StreamNameFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

            assert_eq!(msg.payload_str(), case.expected);
        }
    }

    #[test]
    fn stream_route_routes_by_prefix() {
        struct TestCase {
            payload: String,
            expected_payload: &'static str,
            expected_stream: StreamId,
        }

        let cases = vec![
            TestCase {
                payload: format!("{}:test", LOG_INTERNAL_STREAM),
                expected_payload: "test",
                expected_stream: StreamId::log_internal(),
            },
            TestCase {
                payload: ":test".to_string(),
                expected_payload: "test",
                expected_stream: StreamId::dropped(),
            },
            TestCase {
                payload: "no route: test".to_string(),
                expected_payload: "no route: test",
                expected_stream: StreamId::dropped(),
            },
            TestCase {
                payload: "plain".to_string(),
                expected_payload: "plain",
                expected_stream: StreamId::dropped(),
            },
        ];

        let formatter = StreamRouteFormatter::from_config(&ModulatorConfig::new("stream_route")).unwrap();
        for case in cases {
            let mut msg = Message::new(case.payload.clone(), StreamId::dropped(), 0);
            formatter.apply(&mut msg).unwrap();
            assert_eq!(msg.payload_str(), case.expected_payload, "{}", case.payload);
            assert_eq!(msg.stream_id, case.expected_stream, "{}", case.payload);
        }
    }

    #[test]
    fn stream_route_records_previous_stream() {
        let formatter = StreamRouteFormatter::from_config(
            &ModulatorConfig::new("stream_route").with_option("delimiter", "=>"),
        )
        .unwrap();
        let mut msg = Message::new("audit=>login", StreamId::dropped(), 0);

        formatter.apply(&mut msg).unwrap();

        assert_eq!(msg.payload_str(), "login");
        assert_eq!(msg.stream_id, StreamId::of("audit"));
        assert_eq!(msg.prev_stream_id, StreamId::dropped());
    }

    #[test]
    fn stream_revert_restores_previous_stream() {
        let mut msg = Message::new("test", StreamId::log_internal(), 0);
        msg.set_stream_id(StreamId::dropped());

        StreamRevertFormatter::from_config(&ModulatorConfig::new("stream_revert"))
            .unwrap()
            .apply(&mut msg)
            .unwrap();

        assert_eq!(msg.stream_id, StreamId::log_internal());
        assert_eq!(msg.prev_stream_id, StreamId::dropped());
    }
}
