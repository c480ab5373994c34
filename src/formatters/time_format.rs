// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Time layouts shared by `timestamp`, `convert_time`, `text_to_json` and the
//! `process_*` formatters.
//!
//! A layout is either a chrono strftime string or one of the unix epoch keywords
//! `s`, `ms` and `ns`. Naive date-times are interpreted as UTC.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::errors::{ConfigError, FormatError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TimeLayout {
    UnixSeconds,
    UnixMillis,
    UnixNanos,
    Strftime(String),
}

impl TimeLayout {
    /// Parse a configured layout. An empty string means unix seconds.
    pub fn from_config(formatter: &str, layout: &str) -> Result<Self, ConfigError> {
        match layout {
            "" | "s" => Ok(TimeLayout::UnixSeconds),
            "ms" => Ok(TimeLayout::UnixMillis),
            "ns" => Ok(TimeLayout::UnixNanos),
            other => {
                validate_strftime(formatter, other)?;
                Ok(TimeLayout::Strftime(other.to_string()))
            }
        }
    }

    pub fn is_unix(&self) -> bool {
        !matches!(self, TimeLayout::Strftime(_))
    }

    pub fn parse(&self, value: &str) -> Result<DateTime<Utc>, FormatError> {
        let value = value.trim();
        let time_error = |reason: String| FormatError::TimeParse {
            value: value.to_string(),
            reason,
        };

        let epoch = || {
            value
                .parse::<i64>()
                .map_err(|e| time_error(e.to_string()))
        };

        let parsed = match self {
            TimeLayout::UnixSeconds => Utc.timestamp_opt(epoch()?, 0).single(),
            TimeLayout::UnixMillis => Utc.timestamp_millis_opt(epoch()?).single(),
            TimeLayout::UnixNanos => Some(Utc.timestamp_nanos(epoch()?)),
            TimeLayout::Strftime(layout) => return parse_strftime(value, layout).map_err(time_error),
        };
        parsed.ok_or_else(|| time_error("timestamp out of range".to_string()))
    }

    /// Parse a timestamp at the start of `value`, returning it with the unparsed rest.
    pub fn parse_prefix<'v>(&self, value: &'v str) -> Result<(DateTime<Utc>, &'v str), FormatError> {
        match self {
            TimeLayout::Strftime(layout) => NaiveDateTime::parse_and_remainder(value, layout)
                .map(|(time, rest)| (Utc.from_utc_datetime(&time), rest))
                .map_err(|e| FormatError::TimeParse {
                    value: value.to_string(),
                    reason: e.to_string(),
                }),
            _ => {
                let end = value
                    .char_indices()
                    .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && *c == '-')))
                    .map(|(i, _)| i)
                    .unwrap_or(value.len());
                Ok((self.parse(&value[..end])?, &value[end..]))
            }
        }
    }

    pub fn format(&self, time: &DateTime<Utc>) -> String {
        match self {
            TimeLayout::UnixSeconds => time.timestamp().to_string(),
            TimeLayout::UnixMillis => time.timestamp_millis().to_string(),
            TimeLayout::UnixNanos => time.timestamp_nanos_opt().unwrap_or_default().to_string(),
            TimeLayout::Strftime(layout) => time.format(layout).to_string(),
        }
    }
}

/// Reject strftime strings chrono cannot format.
pub(crate) fn validate_strftime(formatter: &str, layout: &str) -> Result<(), ConfigError> {
    if StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::invalid_options(
            formatter,
            format!("invalid time format '{}'", layout),
        ));
    }
    Ok(())
}

fn parse_strftime(value: &str, layout: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(time) = DateTime::parse_from_str(value, layout) {
        return Ok(time.with_timezone(&Utc));
    }
    if let Ok(time) = NaiveDateTime::parse_from_str(value, layout) {
        return Ok(Utc.from_utc_datetime(&time));
    }
    match NaiveDate::parse_from_str(value, layout) {
        Ok(date) => Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())),
        Err(e) => Err(e.to_string()),
    }
}
