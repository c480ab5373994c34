// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Conversion of collectd JSON packets into InfluxDB write formats.

use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::influx::escape_tag;
use crate::formatters::Content;
use crate::message::Message;
use crate::traits::Formatter;

/// InfluxDB write format produced by `collectd_to_influx`.
///
/// Accepts both `version: "0.9"` and the unquoted YAML number `version: 0.9`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "serde_yaml::Value")]
pub enum InfluxVersion {
    /// JSON series with `name`, `columns` and `points`.
    V08,
    /// JSON points with tags and fields.
    V09,
    /// Line protocol.
    #[default]
    V10,
}

impl TryFrom<serde_yaml::Value> for InfluxVersion {
    type Error = String;

    fn try_from(value: serde_yaml::Value) -> Result<Self, Self::Error> {
        let version = match &value {
            serde_yaml::Value::String(s) => s.clone(),
            serde_yaml::Value::Number(n) => n.to_string(),
            other => return Err(format!("unsupported influx version {:?}", other)),
        };
        match version.as_str() {
            "0.8" => Ok(InfluxVersion::V08),
            "0.9" => Ok(InfluxVersion::V09),
            "1" | "1.0" => Ok(InfluxVersion::V10),
            other => Err(format!("unsupported influx version {}", other)),
        }
    }
}

/// Options for the `collectd_to_influx` formatter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectdToInfluxConfig {
    pub version: InfluxVersion,
}

/// One collectd value list as written by the collectd JSON output.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct CollectdPacket {
    values: Vec<f64>,
    dstypes: Vec<String>,
    dsnames: Vec<String>,
    time: f64,
    host: String,
    plugin: String,
    plugin_instance: String,
    #[serde(rename = "type")]
    plugin_type: String,
    type_instance: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CollectdPayload {
    Many(Vec<CollectdPacket>),
    One(CollectdPacket),
}

impl CollectdPacket {
    fn metric_name(&self) -> String {
        let suffix = |value: &str| {
            if value.is_empty() {
                String::new()
            } else {
                format!("-{}", value)
            }
        };
        format!(
            "{}.{}{}.{}{}",
            self.host,
            self.plugin,
            suffix(&self.plugin_instance),
            self.plugin_type,
            suffix(&self.type_instance)
        )
    }

    /// Index aligned `(dstype, dsname, value)` triples.
    fn data_sources(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.dstypes
            .iter()
            .zip(&self.dsnames)
            .zip(&self.values)
            .map(|((dstype, dsname), value)| (dstype.as_str(), dsname.as_str(), *value))
    }

    fn write_v08(&self, out: &mut String) {
        let name = self.metric_name();
        for value in &self.values {
            out.push_str(&format!(
                r#"{{"name": "{}", "columns": ["time", "value"], "points":[[{}, {:.6}]]}},"#,
                name, self.time as i64, value
            ));
        }
    }

    fn write_v09(&self, out: &mut String) {
        let fixed = format!(
            r#"{{"name": "{}", "timestamp": {}, "precision": "ms", "tags": {{"plugin_instance": "{}", "type": "{}", "type_instance": "{}", "host": "{}""#,
            self.plugin,
            self.time as i64,
            self.plugin_instance,
            self.plugin_type,
            self.type_instance,
            self.host
        );
        for (dstype, dsname, value) in self.data_sources() {
            out.push_str(&format!(
                r#"{}, "dstype": "{}", "dsname": "{}"}}, "fields": {{"value": {:.6}}} }},"#,
                fixed, dstype, dsname, value
            ));
        }
    }

    fn write_v10(&self, out: &mut String) {
        let timestamp = (self.time * 1000.0) as i64;
        let fixed = format!(
            "{},plugin_instance={},type={},type_instance={},host={}",
            escape_tag(&self.plugin),
            escape_tag(&self.plugin_instance),
            escape_tag(&self.plugin_type),
            escape_tag(&self.type_instance),
            escape_tag(&self.host)
        );
        for (dstype, dsname, value) in self.data_sources() {
            out.push_str(&format!(
                "{},dstype={},dsname={} value={:.6} {}\n",
                fixed,
                escape_tag(dstype),
                escape_tag(dsname),
                value,
                timestamp
            ));
        }
    }
}

/// Converts collectd JSON (one packet or an array of packets) to InfluxDB input.
pub struct CollectdToInfluxFormatter {
    content: Content,
    version: InfluxVersion,
}

impl CollectdToInfluxFormatter {
    pub fn new(content: Content, config: CollectdToInfluxConfig) -> Self {
        Self {
            content,
            version: config.version,
        }
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(cfg.content(), cfg.options_as()?))
    }
}

impl Formatter for CollectdToInfluxFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let packets = match serde_json::from_slice(&self.content.source_bytes(msg))? {
            CollectdPayload::Many(packets) => packets,
            CollectdPayload::One(packet) => vec![packet],
        };

        let mut out = String::new();
        for packet in &packets {
            match self.version {
                InfluxVersion::V08 => packet.write_v08(&mut out),
                InfluxVersion::V09 => packet.write_v09(&mut out),
                InfluxVersion::V10 => packet.write_v10(&mut out),
            }
        }
        self.content.set_target_bytes(msg, out.into_bytes());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collectd_to_influx"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StreamId;

    const PACKET: &str = r#"[{"values":[42],"dstypes":["gauge"],"dsnames":["legacy"],"time":1426585562.999,"interval":10.000,"host":"example.com","plugin":"golang","plugin_instance":"","type":"gauge","type_instance":""}]"#;

    #[test]
    fn converts_to_each_version() {
        struct TestCase {
            version: Option<&'static str>,
            expected: &'static str,
        }

        let cases = vec![
            TestCase {
                version: None,
                expected: "golang,plugin_instance=,type=gauge,type_instance=,host=example.com,dstype=gauge,dsname=legacy value=42.000000 1426585562999\n",
            },
            TestCase {
                version: Some("0.9"),
                expected: r#"{"name": "golang", "timestamp": 1426585562, "precision": "ms", "tags": {"plugin_instance": "", "type": "gauge", "type_instance": "", "host": "example.com", "dstype": "gauge", "dsname": "legacy"}, "fields": {"value": 42.000000} },"#,
            },
            TestCase {
                version: Some("0.8"),
                expected: r#"{"name": "example.com.golang.gauge", "columns": ["time", "value"], "points":[[1426585562, 42.000000]]},"#,
            },
        ];

        for case in cases {
            let mut cfg = ModulatorConfig::new("collectd_to_influx");
            if let Some(version) = case.version {
                cfg = cfg.with_option("version", version);
            }
            let mut msg = Message::new(PACKET, StreamId::INVALID, 0);

            CollectdToInfluxFormatter::from_config(&cfg).unwrap().apply(&mut msg).unwrap();

            assert_eq!(msg.payload_str(), case.expected, "{:?}", case.version);
        }
    }

    #[test]
    fn accepts_single_packet_and_multiple_sources() {
        let packet = r#"{"values":[1.5,2],"dstypes":["derive","derive"],"dsnames":["rx","tx"],"time":10,"host":"h","plugin":"if","plugin_instance":"eth 0","type":"octets","type_instance":""}"#;
        let mut msg = Message::new(packet, StreamId::INVALID, 0);

        CollectdToInfluxFormatter::from_config(&ModulatorConfig::new("collectd_to_influx"))
            .unwrap()
            .apply(&mut msg)
            .unwrap();

        assert_eq!(
            msg.payload_str(),
            "if,plugin_instance=eth\\ 0,type=octets,type_instance=,host=h,dstype=derive,dsname=rx value=1.500000 10000\n\
             if,plugin_instance=eth\\ 0,type=octets,type_instance=,host=h,dstype=derive,dsname=tx value=2.000000 10000\n"
        );
    }

    #[test]
    fn v10_timestamp_is_truncated_to_milliseconds() {
        let packet = r#"{"values":[1],"dstypes":["gauge"],"dsnames":["v"],"time":10.9999,"host":"h","plugin":"p","plugin_instance":"","type":"t","type_instance":""}"#;
        let mut msg = Message::new(packet, StreamId::INVALID, 0);

        CollectdToInfluxFormatter::from_config(&ModulatorConfig::new("collectd_to_influx"))
            .unwrap()
            .apply(&mut msg)
            .unwrap();

        assert!(msg.payload_str().ends_with(" value=1.000000 10999\n"), "{}", msg.payload_str());
    }

    #[test]
    fn rejects_invalid_input() {
        let mut msg = Message::new("not json", StreamId::INVALID, 0);
        let formatter =
            CollectdToInfluxFormatter::from_config(&ModulatorConfig::new("collectd_to_influx")).unwrap();
        assert!(formatter.apply(&mut msg).is_err());

        let cfg = ModulatorConfig::new("collectd_to_influx").with_option("version", "2.0");
        assert!(CollectdToInfluxFormatter::from_config(&cfg).is_err());
    }

    #[test]
    fn accepts_numeric_version() {
        let cfg = ModulatorConfig::new("collectd_to_influx").with_option("version", 0.8f64);
        let formatter = CollectdToInfluxFormatter::from_config(&cfg).unwrap();
        assert_eq!(formatter.version, InfluxVersion::V08);
    }
}
