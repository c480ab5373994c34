// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::*;
use crate::config::ModulatorConfig;
use crate::engine::{FormatterModulator, ModulatorArray};
use crate::errors::ConfigError;
use crate::traits::{Formatter, Modulator};

/// Factory for creating formatter instances from modulator configuration
pub struct FormatterFactory;

impl FormatterFactory {
    /// Create a formatter instance from configuration
    ///
    /// The `type` field in the config determines which formatter to create and the
    /// `options` map is deserialized into that formatter's option struct. Unknown
    /// option keys and invalid option values are reported as
    /// [`ConfigError::InvalidOptions`].
    pub fn create_formatter(cfg: &ModulatorConfig) -> Result<Arc<dyn Formatter>, ConfigError> {
        let formatter: Arc<dyn Formatter> = match cfg.formatter.as_str() {
            // Routing-free basics
            "forward" => Arc::new(ForwardFormatter::from_config(cfg)?),
            "copy" => Arc::new(CopyFormatter::from_config(cfg)?),
            "move" => Arc::new(MoveFormatter::from_config(cfg)?),
            "delete" | "clear" => Arc::new(DeleteFormatter::from_config(cfg)?),
            "metadata_copy" => Arc::new(MetadataCopyFormatter::from_config(cfg)?),

            // Framing and stamping
            "base64_encode" => Arc::new(Base64EncodeFormatter::from_config(cfg)?),
            "base64_decode" => Arc::new(Base64DecodeFormatter::from_config(cfg)?),
            "envelope" => Arc::new(EnvelopeFormatter::from_config(cfg)?),
            "delimiter" => Arc::new(DelimiterFormatter::from_config(cfg)?),
            "timestamp" => Arc::new(TimestampFormatter::from_config(cfg)?),
            "hostname" => Arc::new(HostnameFormatter::from_config(cfg)?),
            "sequence" => Arc::new(SequenceFormatter::from_config(cfg)?),
            "runlength" => Arc::new(RunlengthFormatter::from_config(cfg)?),
            "identifier" => Arc::new(IdentifierFormatter::from_config(cfg)?),
            "serialize" => Arc::new(SerializeFormatter::from_config(cfg)?),

            // Text manipulation
            "trim" => Arc::new(TrimFormatter::from_config(cfg)?),
            "trim_to_bounds" => Arc::new(TrimToBoundsFormatter::from_config(cfg)?),
            "split_pick" => Arc::new(SplitPickFormatter::from_config(cfg)?),
            "split_to_fields" => Arc::new(SplitToFieldsFormatter::from_config(cfg)?),
            "split" => Arc::new(SplitFormatter::from_config(cfg)?),
            "split_to_json" => Arc::new(SplitToJsonFormatter::from_config(cfg)?),
            "regexp" => Arc::new(RegexpFormatter::from_config(cfg)?),
            "template" => Arc::new(TemplateFormatter::from_config(cfg)?),
            "template_json" => Arc::new(TemplateJsonFormatter::from_config(cfg)?),

            // Structured data
            "to_json" => Arc::new(ToJsonFormatter::from_config(cfg)?),
            "to_csv" => Arc::new(ToCsvFormatter::from_config(cfg)?),
            "json_to_array" => Arc::new(JsonToArrayFormatter::from_config(cfg)?),
            "extract_json" => Arc::new(ExtractJsonFormatter::from_config(cfg)?),
            "process_json" => Arc::new(ProcessJsonFormatter::from_config(cfg)?),
            "process_tsv" => Arc::new(ProcessTsvFormatter::from_config(cfg)?),
            "text_to_json" => Arc::new(TextToJsonFormatter::from_config(cfg)?),
            "flatten" => Arc::new(FlattenFormatter::from_config(cfg)?),
            "cast" => Arc::new(CastFormatter::from_config(cfg)?),
            "convert_time" => Arc::new(ConvertTimeFormatter::from_config(cfg)?),

            // Composition
            "aggregate" => Arc::new(AggregateFormatter::from_config(cfg)?),
            "double" => Arc::new(DoubleFormatter::from_config(cfg)?),

            // Stream bookkeeping
            "stream_name" => Arc::new(StreamNameFormatter::from_config(cfg)?),
            "stream_route" => Arc::new(StreamRouteFormatter::from_config(cfg)?),
            "stream_revert" => Arc::new(StreamRevertFormatter::from_config(cfg)?),

            // Enrichment and metrics
            "grok" => Arc::new(GrokFormatter::from_config(cfg)?),
            "grok_to_json" => Arc::new(GrokToJsonFormatter::from_config(cfg)?),
            "agent" => Arc::new(AgentFormatter::from_config(cfg)?),
            "geoip" => Arc::new(GeoIpFormatter::from_config(cfg)?),
            "json_to_influx10" => Arc::new(JsonToInflux10Formatter::from_config(cfg)?),
            "collectd_to_influx" => Arc::new(CollectdToInfluxFormatter::from_config(cfg)?),

            other => return Err(ConfigError::UnknownFormatter(other.to_string())),
        };
        Ok(formatter)
    }

    /// Wrap the configured formatter in a [`FormatterModulator`].
    ///
    /// `index` is the position in the enclosing list and names anonymous modulators.
    pub fn create_modulator(cfg: &ModulatorConfig, index: usize) -> Result<Box<dyn Modulator>, ConfigError> {
        let formatter = Self::create_formatter(cfg)?;
        Ok(Box::new(FormatterModulator::new(cfg.display_id(index), formatter)))
    }

    /// Build a modulator array from an ordered list of configs.
    pub fn build_pipeline(configs: &[ModulatorConfig]) -> Result<ModulatorArray, ConfigError> {
        let mut array = ModulatorArray::default();
        for (index, cfg) in configs.iter().enumerate() {
            array.push(Self::create_modulator(cfg, index)?);
        }
        Ok(array)
    }

    /// List all available formatter names
    pub fn list_available_formatters() -> Vec<&'static str> {
        vec![
            "forward",
            "copy",
            "move",
            "delete",
            "clear",
            "metadata_copy",
            "base64_encode",
            "base64_decode",
            "envelope",
            "delimiter",
            "timestamp",
            "hostname",
            "sequence",
            "runlength",
            "identifier",
            "serialize",
            "trim",
            "trim_to_bounds",
            "split_pick",
            "split_to_fields",
            "split",
            "split_to_json",
            "regexp",
            "template",
            "template_json",
            "to_json",
            "to_csv",
            "json_to_array",
            "extract_json",
            "process_json",
            "process_tsv",
            "text_to_json",
            "flatten",
            "cast",
            "convert_time",
            "aggregate",
            "double",
            "stream_name",
            "stream_route",
            "stream_revert",
            "grok",
            "grok_to_json",
            "agent",
            "geoip",
            "json_to_influx10",
            "collectd_to_influx",
        ]
    }

    /// Check if a formatter name is available
    pub fn is_formatter_available(name: &str) -> bool {
        Self::list_available_formatters().contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Message, StreamId};
    use crate::traits::ModulateResult;

    /// Formatters that build without any options.
    const NO_REQUIRED_OPTIONS: &[&str] = &[
        "forward",
        "copy",
        "move",
        "delete",
        "clear",
        "metadata_copy",
        "base64_encode",
        "base64_decode",
        "envelope",
        "delimiter",
        "timestamp",
        "hostname",
        "sequence",
        "runlength",
        "identifier",
        "serialize",
        "trim",
        "trim_to_bounds",
        "split_pick",
        "split_to_fields",
        "split_to_json",
        "regexp",
        "template",
        "template_json",
        "to_json",
        "to_csv",
        "json_to_array",
        "extract_json",
        "process_json",
        "process_tsv",
        "cast",
        "convert_time",
        "aggregate",
        "double",
        "stream_name",
        "stream_route",
        "stream_revert",
        "grok",
        "grok_to_json",
        "agent",
        "json_to_influx10",
        "collectd_to_influx",
    ];

    #[test]
    fn every_listed_formatter_is_constructible() {
        for name in NO_REQUIRED_OPTIONS {
            let cfg = ModulatorConfig::new(name);
            let formatter = FormatterFactory::create_formatter(&cfg)
                .unwrap_or_else(|e| panic!("failed to create {}: {}", name, e));
            assert!(FormatterFactory::is_formatter_available(formatter.name()), "{}", name);
        }
    }

    #[test]
    fn metadata_only_formatters_need_metadata_fields() {
        for name in ["split", "flatten", "text_to_json", "geoip"] {
            assert!(FormatterFactory::is_formatter_available(name));
            assert!(FormatterFactory::create_formatter(&ModulatorConfig::new(name)).is_err(), "{}", name);
        }
    }

    #[test]
    fn unknown_formatter_is_rejected() {
        let result = FormatterFactory::create_formatter(&ModulatorConfig::new("reverse_text"));
        assert!(matches!(result, Err(ConfigError::UnknownFormatter(name)) if name == "reverse_text"));
        assert!(!FormatterFactory::is_formatter_available("reverse_text"));
    }

    #[test]
    fn invalid_options_are_rejected() {
        let cfg = ModulatorConfig::new("envelope").with_option("prefx", "[");
        assert!(matches!(
            FormatterFactory::create_formatter(&cfg),
            Err(ConfigError::InvalidOptions { .. })
        ));
    }

    #[test]
    fn build_pipeline_chains_formatters() {
        let configs = vec![
            ModulatorConfig::new("envelope")
                .with_option("prefix", "<")
                .with_option("postfix", ">"),
            ModulatorConfig::new("base64_encode"),
            ModulatorConfig::new("base64_decode"),
        ];
        let pipeline = FormatterFactory::build_pipeline(&configs).unwrap();
        assert_eq!(pipeline.len(), 3);

        let mut msg = Message::new("hello", StreamId::INVALID, 0);
        assert_eq!(pipeline.modulate(&mut msg), ModulateResult::Continue);
        assert_eq!(msg.payload, b"<hello>");
    }
}
