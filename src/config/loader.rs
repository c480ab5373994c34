// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_FALLBACK_STREAM, DEFAULT_INPUT_STREAM};
use crate::errors::{ConfigError, FailureStrategy};
use crate::formatters::Content;
use crate::observability::messages::config::{ConfigLoaded, EmptyPipeline, ValidationFailed};
use crate::observability::messages::StructuredLog;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main configuration structure for a modulator pipeline.
///
/// This struct describes the ordered list of modulators every message runs through,
/// how batches of messages are executed, and where messages go when the pipeline
/// asks for a fallback. It is loaded from a YAML file, or TOML when the file ends in
/// `.toml`.
///
/// # Fields
/// * `strategy` - How batches are executed (optional, defaults to `sequential`)
/// * `failure_strategy` - Whether a discarded message aborts the batch (optional)
/// * `executor_options` - Executor-specific options (optional)
/// * `stream` - Stream assigned to messages read by the CLI driver
/// * `fallback_stream` - Stream assigned to messages routed to fallback
/// * `modulators` - Ordered pipeline steps
///
/// # Example
/// ```yaml
/// strategy: concurrent
/// failure_strategy: continue_on_error
/// executor_options:
///   max_concurrency: 4
/// stream: access_log
/// modulators:
///   - id: parse
///     type: split_to_fields
///     target: fields
///     options:
///       delimiter: " "
///       fields: [ip, method, path]
///   - type: to_json
///     options:
///       root: fields
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default = "default_input_stream")]
    pub stream: String,
    #[serde(default = "default_fallback_stream")]
    pub fallback_stream: String,
    #[serde(default)]
    pub modulators: Vec<ModulatorConfig>,
}

fn default_input_stream() -> String {
    DEFAULT_INPUT_STREAM.to_string()
}

fn default_fallback_stream() -> String {
    DEFAULT_FALLBACK_STREAM.to_string()
}

/// Execution strategy for message batches.
///
/// # Variants
/// * `Sequential` - One message after another on the calling task
/// * `Concurrent` - Messages fan out to blocking workers, results keep input order
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Sequential,
    Concurrent,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Concurrent => "concurrent",
        }
    }
}

/// Executor-specific configuration options.
///
/// # Fields
/// * `max_concurrency` - Upper bound of messages processed at the same time by the
///   concurrent executor (optional, defaults to the number of available cores)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutorOptions {
    pub max_concurrency: Option<usize>,
}

/// Configuration for a single pipeline step.
///
/// `type` selects the formatter. `source` and `target` address the payload (empty or
/// missing) or a metadata key; both default to `apply_to`. Everything
/// formatter-specific lives in `options` and is deserialized into the formatter's own
/// option struct when the pipeline is built.
///
/// # Example
/// ```yaml
/// id: "stamp"
/// type: timestamp
/// apply_to: "line"
/// options:
///   format: "%H:%M:%S "
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ModulatorConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub formatter: String,
    #[serde(default)]
    pub apply_to: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub options: HashMap<String, serde_yaml::Value>, // formatter-specific options
}

impl ModulatorConfig {
    pub fn new(formatter: &str) -> Self {
        Self {
            formatter: formatter.to_string(),
            ..Default::default()
        }
    }

    pub fn with_option(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn with_apply_to(mut self, apply_to: &str) -> Self {
        self.apply_to = Some(apply_to.to_string());
        self
    }

    /// The configured id, or `type#index` for anonymous modulators.
    pub fn display_id(&self, index: usize) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| format!("{}#{}", self.formatter, index))
    }

    /// Source and target fields after applying the `apply_to` default.
    pub fn content(&self) -> Content {
        let apply_to = self.apply_to.as_deref().unwrap_or("");
        Content::new(
            self.source.as_deref().unwrap_or(apply_to),
            self.target.as_deref().unwrap_or(apply_to),
        )
    }

    /// Deserialize `options` into the formatter's option struct.
    pub fn options_as<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let mapping: serde_yaml::Mapping = self
            .options
            .iter()
            .map(|(k, v)| (serde_yaml::Value::String(k.clone()), v.clone()))
            .collect();
        serde_yaml::from_value(serde_yaml::Value::Mapping(mapping))
            .map_err(|e| ConfigError::invalid_options(&self.formatter, e))
    }
}

/// Configuration file syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Parse configuration text in the given syntax.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    let cfg = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    Ok(cfg)
}

/// Load a config from a YAML or TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = parse_config(&content, ConfigFormat::from_path(path))?;

    ConfigLoaded {
        path: &path.display().to_string(),
        strategy: cfg.strategy.as_str(),
        modulator_count: cfg.modulators.len(),
    }
    .log();

    Ok(cfg)
}

/// Load and validate a config file
///
/// This function loads the configuration and checks that every modulator names a
/// known formatter, that modulator ids are unique and that executor options are in
/// range.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;

    if let Err(validation_errors) = crate::config::validate_config(&cfg) {
        let messages: Vec<String> = validation_errors.iter().map(|e| e.to_string()).collect();
        ValidationFailed { errors: &messages }.log();
        return Err(ConfigError::Validation(validation_errors));
    }

    if cfg.modulators.is_empty() {
        EmptyPipeline.log();
    }

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatters::Field;
    use std::io::Write;

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
strategy: concurrent
failure_strategy: fail_fast
executor_options:
  max_concurrency: 2
modulators:
  - id: stamp
    type: timestamp
  - type: envelope
    target: wrapped
    options:
      prefix: "<"
      postfix: ">"
"#;

        let cfg = parse_config(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(cfg.strategy, Strategy::Concurrent);
        assert_eq!(cfg.failure_strategy, FailureStrategy::FailFast);
        assert_eq!(cfg.executor_options.max_concurrency, Some(2));
        assert_eq!(cfg.modulators.len(), 2);
        assert_eq!(cfg.modulators[0].display_id(0), "stamp");
        assert_eq!(cfg.modulators[1].display_id(1), "envelope#1");
        assert_eq!(cfg.stream, DEFAULT_INPUT_STREAM);
        assert_eq!(cfg.fallback_stream, DEFAULT_FALLBACK_STREAM);
    }

    #[test]
    fn defaults_apply_to_empty_config() {
        let cfg = parse_config("{}", ConfigFormat::Yaml).unwrap();
        assert_eq!(cfg.strategy, Strategy::Sequential);
        assert_eq!(cfg.failure_strategy, FailureStrategy::ContinueOnError);
        assert!(cfg.modulators.is_empty());
    }

    #[test]
    fn parse_toml_config() {
        let toml_text = r#"
strategy = "sequential"
stream = "events"

[[modulators]]
type = "delimiter"
options = { delimiter = ";" }
"#;

        let cfg = parse_config(toml_text, ConfigFormat::Toml).unwrap();
        assert_eq!(cfg.stream, "events");
        assert_eq!(cfg.modulators[0].formatter, "delimiter");
        assert_eq!(
            cfg.modulators[0].options.get("delimiter"),
            Some(&serde_yaml::Value::String(";".to_string()))
        );
    }

    #[test]
    fn apply_to_is_the_default_for_source_and_target() {
        struct TestCase {
            config: ModulatorConfig,
            source: Field,
            target: Field,
        }

        let cases = vec![
            TestCase {
                config: ModulatorConfig::new("copy"),
                source: Field::Payload,
                target: Field::Payload,
            },
            TestCase {
                config: ModulatorConfig::new("copy").with_apply_to("a"),
                source: Field::Metadata("a".to_string()),
                target: Field::Metadata("a".to_string()),
            },
            TestCase {
                config: ModulatorConfig::new("copy").with_apply_to("a").with_target("b"),
                source: Field::Metadata("a".to_string()),
                target: Field::Metadata("b".to_string()),
            },
            TestCase {
                config: ModulatorConfig::new("copy").with_apply_to("a").with_source(""),
                source: Field::Payload,
                target: Field::Metadata("a".to_string()),
            },
        ];

        for case in cases {
            let content = case.config.content();
            assert_eq!(content.source, case.source, "config {:?}", case.config);
            assert_eq!(content.target, case.target, "config {:?}", case.config);
        }
    }

    #[test]
    fn options_reject_unknown_keys() {
        #[derive(Debug, Deserialize, Default)]
        #[serde(default, deny_unknown_fields)]
        struct Options {
            prefix: String,
        }

        let good = ModulatorConfig::new("envelope").with_option("prefix", "[");
        assert_eq!(good.options_as::<Options>().unwrap().prefix, "[");

        let bad = ModulatorConfig::new("envelope").with_option("prefx", "[");
        assert!(matches!(
            bad.options_as::<Options>(),
            Err(ConfigError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn load_config_picks_format_from_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "stream = \"from_toml\"").unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.stream, "from_toml");
    }

    #[test]
    fn load_and_validate_rejects_unknown_formatter() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "modulators:\n  - type: no_such_formatter").unwrap();

        let result = load_and_validate_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(errors)) if errors.len() == 1));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
