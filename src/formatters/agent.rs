// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::user_agent::{UserAgent, AGENT_FIELDS};
use crate::formatters::Content;
use crate::message::Message;
use crate::traits::Formatter;

/// Options for the `agent` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Any of mozilla, platform, os, localization, engine, engine-version, browser,
    /// browser-version, bot and mobile.
    pub fields: Vec<String>,
    /// Prepended to every metadata key written.
    pub prefix: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            fields: ["platform", "os", "localization", "browser"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            prefix: String::new(),
        }
    }
}

/// Parses a user-agent string into metadata fields.
pub struct AgentFormatter {
    content: Content,
    fields: Vec<String>,
    prefix: String,
}

impl AgentFormatter {
    pub fn new(content: Content, config: AgentConfig) -> Result<Self, ConfigError> {
        let fields = config
            .fields
            .iter()
            .map(|field| {
                let field = field.to_lowercase();
                if AGENT_FIELDS.contains(&field.as_str()) {
                    Ok(field)
                } else {
                    Err(ConfigError::invalid_options(
                        "agent",
                        format!("unknown field '{}'", field),
                    ))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            content,
            fields,
            prefix: config.prefix,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Self::new(cfg.content(), cfg.options_as()?)
    }
}

impl Formatter for AgentFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let agent = UserAgent::parse(&self.content.source_string(msg));
        let target = self.content.target_metadata(msg);
        for field in &self.fields {
            if let Some(value) = agent.field(field) {
                target.set(&format!("{}{}", self.prefix, field), value);
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "agent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{StreamId, Value};

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 10_3_1 like Mac OS X) AppleWebKit/603.1.30 (KHTML, like Gecko) Version/10.0 Mobile/14E304 Safari/602.1";

    #[test]
    fn writes_default_fields() {
        let mut msg = Message::new(IPHONE, StreamId::INVALID, 0);

        AgentFormatter::from_config(&ModulatorConfig::new("agent"))
            .unwrap()
            .apply(&mut msg)
            .unwrap();

        assert_eq!(msg.metadata.get_string("platform").as_deref(), Some("iPhone"));
        assert_eq!(
            msg.metadata.get_string("os").as_deref(),
            Some("CPU iPhone OS 10_3_1 like Mac OS X")
        );
        assert_eq!(msg.metadata.get_string("localization").as_deref(), Some(""));
        assert_eq!(msg.metadata.get_string("browser").as_deref(), Some("Safari"));
        assert_eq!(msg.metadata.len(), 4);
    }

    #[test]
    fn writes_selected_fields_with_prefix_into_target() {
        let cfg = ModulatorConfig::new("agent")
            .with_source("ua")
            .with_target("client")
            .with_option("fields", vec!["Browser-Version", "mobile", "bot"])
            .with_option("prefix", "ua_");
        let mut msg = Message::new("PAYLOAD", StreamId::INVALID, 0);
        msg.metadata.set("ua", IPHONE);

        AgentFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert_eq!(
            msg.metadata.get_string("client/ua_browser-version").as_deref(),
            Some("10.0")
        );
        assert_eq!(msg.metadata.get("client/ua_mobile"), Some(&Value::Bool(true)));
        assert_eq!(msg.metadata.get("client/ua_bot"), Some(&Value::Bool(false)));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let cfg = ModulatorConfig::new("agent").with_option("fields", vec!["colour"]);
        assert!(AgentFormatter::from_config(&cfg).is_err());
    }

    #[test]
    fn non_ascii_agent_in_metadata() {
        let cfg = ModulatorConfig::new("agent").with_apply_to("ua");
        let mut msg = Message::new("PAYLOAD", StreamId::INVALID, 0);
        msg.metadata.set("ua", "Mozilla/5.0 (X11)é Gecko/1");

        AgentFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert_eq!(msg.metadata.get_string("ua/platform").as_deref(), Some("X11"));
        assert_eq!(msg.payload_str(), "PAYLOAD");
    }
}
