// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The formatter catalogue.
//!
//! Every formatter reads its input from a configurable source (the payload or a
//! metadata key, see [`Content`]), computes a new value and writes it to a target.
//! Formatters are created by name through [`FormatterFactory`] and wrapped into
//! modulators so they can be chained in a `ModulatorArray`.
//!
//! Option structs are `#[serde(default, deny_unknown_fields)]`: every option has a
//! default and unknown keys are rejected when the pipeline is built.

use serde::Deserialize;

mod aggregate;
mod agent;
mod base64_codec;
mod cast;
mod collectd;
mod content;
mod convert_time;
mod copy;
mod delete;
mod delimiter;
mod double;
mod envelope;
mod extract_json;
mod factory;
mod flatten;
mod forward;
mod geoip;
mod grok;
mod hostname;
mod identifier;
mod influx;
mod json_to_array;
mod metadata_copy;
mod process_json;
mod process_tsv;
mod regexp;
mod runlength;
mod sequence;
mod serialize;
mod split;
mod stream;
mod template;
mod text_to_json;
mod time_format;
mod timestamp;
mod to_csv;
mod to_json;
mod trim;
pub mod user_agent;

pub use aggregate::{AggregateConfig, AggregateFormatter};
pub use agent::{AgentConfig, AgentFormatter};
pub use base64_codec::{Base64DecodeFormatter, Base64EncodeConfig, Base64EncodeFormatter};
pub use cast::{CastConfig, CastFormatter, CastType};
pub use collectd::{CollectdToInfluxConfig, CollectdToInfluxFormatter, InfluxVersion};
pub use content::{Content, Field};
pub use convert_time::{ConvertTimeConfig, ConvertTimeFormatter};
pub use copy::{CopyConfig, CopyFormatter, CopyMode, MoveFormatter};
pub use delete::DeleteFormatter;
pub use delimiter::{DelimiterConfig, DelimiterFormatter};
pub use double::{DoubleConfig, DoubleFormatter};
pub use envelope::{EnvelopeConfig, EnvelopeFormatter};
pub use extract_json::{ExtractJsonConfig, ExtractJsonFormatter};
pub use factory::FormatterFactory;
pub use flatten::{FlattenConfig, FlattenFormatter};
pub use forward::ForwardFormatter;
pub use geoip::{GeoIpConfig, GeoIpDatabase, GeoIpFormatter, GeoIpRecord};
pub use grok::{GrokConfig, GrokFormatter, GrokParser, GrokToJsonFormatter};
pub use hostname::{HostnameConfig, HostnameFormatter};
pub use identifier::{IdentifierConfig, IdentifierFormatter, IdentifierGenerator};
pub use influx::{JsonToInflux10Config, JsonToInflux10Formatter};
pub use json_to_array::{JsonToArrayConfig, JsonToArrayFormatter};
pub use metadata_copy::{MetadataCopyConfig, MetadataCopyFormatter, WriteTarget};
pub use process_json::{ProcessJsonConfig, ProcessJsonFormatter};
pub use process_tsv::{ProcessTsvConfig, ProcessTsvFormatter};
pub use regexp::{RegexpConfig, RegexpFormatter};
pub use runlength::{RunlengthConfig, RunlengthFormatter};
pub use sequence::{SequenceConfig, SequenceFormatter};
pub use serialize::SerializeFormatter;
pub use split::{
    SplitConfig, SplitFormatter, SplitPickConfig, SplitPickFormatter, SplitToFieldsConfig,
    SplitToFieldsFormatter, SplitToJsonConfig, SplitToJsonFormatter,
};
pub use stream::{
    StreamNameConfig, StreamNameFormatter, StreamRevertFormatter, StreamRouteConfig,
    StreamRouteFormatter,
};
pub use template::{TemplateConfig, TemplateFormatter, TemplateJsonFormatter};
pub use text_to_json::{TextToJsonConfig, TextToJsonFormatter};
pub use timestamp::{TimestampConfig, TimestampFormatter};
pub use to_csv::{ToCsvConfig, ToCsvFormatter};
pub use to_json::{ToJsonConfig, ToJsonFormatter};
pub use trim::{TrimConfig, TrimFormatter, TrimToBoundsConfig, TrimToBoundsFormatter};

/// Option struct for formatters without options; rejects any key.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct NoOptions {}
