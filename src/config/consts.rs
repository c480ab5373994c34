// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Stream assigned to messages read by the command line driver
pub const DEFAULT_INPUT_STREAM: &str = "stdin";
/// Stream receiving messages whose pipeline returned `Fallback`
pub const DEFAULT_FALLBACK_STREAM: &str = crate::message::DROPPED_STREAM;
/// Concurrency used when `available_parallelism` cannot be determined
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Separator used by the prefixing formatters (hostname, sequence, runlength, double)
pub const DEFAULT_SEPARATOR: &str = ":";
/// Line delimiter appended by `delimiter` and used as `envelope` postfix
pub const DEFAULT_LINE_DELIMITER: &str = "\n";
/// strftime format prepended by the `timestamp` formatter
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z | ";
/// strftime format used to read `dat` values in `text_to_json`
pub const DEFAULT_TIMESTAMP_READ: &str = "%Y%m%d%H%M%S";
/// strftime format used to write `dat` values in `text_to_json`
pub const DEFAULT_TIMESTAMP_WRITE: &str = "%Y-%m-%d %H:%M:%S %Z";
/// Characters removed by the `trim` formatter
pub const DEFAULT_TRIM_CHARACTERS: &str = " \t\r\n\u{0B}\u{0C}";
/// Geohash precision used for the `location-hash` geoip field
pub const GEOHASH_PRECISION: usize = 12;
