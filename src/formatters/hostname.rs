// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;

use crate::config::consts::DEFAULT_SEPARATOR;
use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::Message;
use crate::traits::Formatter;

/// Options for the `hostname` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostnameConfig {
    pub separator: String,
}

impl Default for HostnameConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// Prepends the local hostname and a separator.
///
/// The hostname is looked up once. If the lookup fails the content is left as is.
pub struct HostnameFormatter {
    content: Content,
    prefix: Vec<u8>,
}

impl HostnameFormatter {
    pub fn new(content: Content, config: HostnameConfig) -> Self {
        let prefix = match hostname::get() {
            Ok(name) => format!("{}{}", name.to_string_lossy(), config.separator).into_bytes(),
            Err(e) => {
                tracing::warn!(error = %e, "Hostname lookup failed, hostname formatter will not prefix");
                Vec::new()
            }
        };
        Self::with_prefix(content, prefix)
    }

    fn with_prefix(content: Content, prefix: Vec<u8>) -> Self {
        Self { content, prefix }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }
}

impl Formatter for HostnameFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let mut data = self.prefix.clone();
        data.extend_from_slice(&self.content.source_bytes(msg));
        self.content.set_target_bytes(msg, data);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "hostname"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    #[test]
    fn prefixes_local_hostname() {
        let host = hostname::get().unwrap().to_string_lossy().into_owned();
        let cfg = ModulatorConfig::new("hostname").with_option("separator", "|");
        let mut msg = Message::new("test", StreamId::INVALID, 0);
        HostnameFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

        assert_eq!(msg.payload_str(), format!("{}|test", host));
    }

    #[test]
    fn missing_hostname_leaves_content() {
        let formatter = HostnameFormatter::with_prefix(Content::default(), Vec::new());
        let mut msg = Message::new("test", StreamId::INVALID, 0);
        formatter.apply(&mut msg).unwrap();
        assert_eq!(msg.payload_str(), "test");
    }
}
