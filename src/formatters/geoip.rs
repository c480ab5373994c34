// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! IP address enrichment from a MaxMind GeoIP2 / GeoLite2 City database.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use maxminddb::geoip2;
use serde::Deserialize;

use crate::config::ModulatorConfig;
use crate::errors::{ConfigError, FormatError};
use crate::formatters::Content;
use crate::message::{Message, Metadata, Value};
use crate::traits::Formatter;

const GEOIP_FIELDS: &[&str] = &[
    "city",
    "country",
    "country-code",
    "continent",
    "continent-code",
    "timezone",
    "proxy",
    "satellite",
    "location",
    "location-hash",
];

const GEOHASH_PRECISION: usize = 12;
const GEOHASH_ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";
const NAME_LANGUAGE: &str = "en";

/// Location data of one resolved address, flattened from a City record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeoIpRecord {
    pub city: Option<String>,
    pub country: Option<String>,
    pub country_code: String,
    pub continent: Option<String>,
    pub continent_code: String,
    pub timezone: String,
    pub latitude: f64,
    pub longitude: f64,
    pub proxy: bool,
    pub satellite: bool,
}

impl GeoIpRecord {
    pub fn from_city(record: &geoip2::City<'_>) -> Self {
        let english = |names: Option<&BTreeMap<&str, &str>>| {
            names.and_then(|names| names.get(NAME_LANGUAGE)).map(|name| name.to_string())
        };

        let mut out = GeoIpRecord::default();
        if let Some(city) = &record.city {
            out.city = english(city.names.as_ref());
        }
        if let Some(country) = &record.country {
            out.country = english(country.names.as_ref());
            out.country_code = country.iso_code.unwrap_or_default().to_string();
        }
        if let Some(continent) = &record.continent {
            out.continent = english(continent.names.as_ref());
            out.continent_code = continent.code.unwrap_or_default().to_string();
        }
        if let Some(location) = &record.location {
            out.timezone = location.time_zone.unwrap_or_default().to_string();
            out.latitude = location.latitude.unwrap_or_default();
            out.longitude = location.longitude.unwrap_or_default();
        }
        if let Some(traits) = &record.traits {
            out.proxy = traits.is_anonymous_proxy.unwrap_or_default();
            out.satellite = traits.is_satellite_provider.unwrap_or_default();
        }
        out
    }

    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "city" => Value::from(self.city.clone()?),
            "country" => Value::from(self.country.clone()?),
            "country-code" => Value::from(self.country_code.as_str()),
            "continent" => Value::from(self.continent.clone()?),
            "continent-code" => Value::from(self.continent_code.as_str()),
            "timezone" => Value::from(self.timezone.as_str()),
            "proxy" => Value::Bool(self.proxy),
            "satellite" => Value::Bool(self.satellite),
            "location" => Value::Array(vec![
                Value::Float(self.latitude),
                Value::Float(self.longitude),
            ]),
            "location-hash" => Value::from(geohash(self.latitude, self.longitude, GEOHASH_PRECISION)),
            _ => return None,
        };
        Some(value)
    }
}

/// Encode a coordinate as a geohash of `precision` characters.
pub(crate) fn geohash(latitude: f64, longitude: f64, precision: usize) -> String {
    let mut lat = (-90.0_f64, 90.0_f64);
    let mut lon = (-180.0_f64, 180.0_f64);
    let mut hash = String::with_capacity(precision);
    let mut even = true;
    let mut bits = 0u8;
    let mut bit_count = 0;

    while hash.len() < precision {
        let (range, value) = if even {
            (&mut lon, longitude)
        } else {
            (&mut lat, latitude)
        };
        let mid = (range.0 + range.1) / 2.0;
        bits <<= 1;
        if value >= mid {
            bits |= 1;
            range.0 = mid;
        } else {
            range.1 = mid;
        }
        even = !even;
        bit_count += 1;

        if bit_count == 5 {
            hash.push(GEOHASH_ALPHABET[bits as usize] as char);
            bits = 0;
            bit_count = 0;
        }
    }
    hash
}

/// An opened MaxMind database, held in memory.
pub struct GeoIpDatabase {
    reader: maxminddb::Reader<Vec<u8>>,
}

impl GeoIpDatabase {
    pub fn open(path: &Path) -> Result<Self, ConfigError> {
        let reader = maxminddb::Reader::open_readfile(path).map_err(|e| {
            ConfigError::invalid_options("geoip", format!("{}: {}", path.display(), e))
        })?;
        Ok(Self { reader })
    }

    /// City record of `address`, or `None` when the database has no entry for it.
    pub fn lookup(&self, address: IpAddr) -> Option<GeoIpRecord> {
        match self.reader.lookup::<geoip2::City>(address) {
            Ok(city) => Some(GeoIpRecord::from_city(&city)),
            Err(e) => {
                tracing::debug!(formatter = "geoip", address = %address, error = %e, "address lookup failed");
                None
            }
        }
    }
}

/// Options for the `geoip` formatter
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeoIpConfig {
    /// Path of the `.mmdb` City database. Required.
    pub database: Option<PathBuf>,
    pub fields: Vec<String>,
    pub prefix: String,
}

impl Default for GeoIpConfig {
    fn default() -> Self {
        Self {
            database: None,
            fields: ["city", "country", "continent", "location-hash"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            prefix: String::new(),
        }
    }
}

fn validate_fields(fields: &[String]) -> Result<Vec<String>, ConfigError> {
    fields
        .iter()
        .map(|field| {
            let field = field.to_lowercase();
            if GEOIP_FIELDS.contains(&field.as_str()) {
                Ok(field)
            } else {
                Err(ConfigError::invalid_options(
                    "geoip",
                    format!("unknown field '{}'", field),
                ))
            }
        })
        .collect()
}

/// Resolves an IP address to location metadata.
pub struct GeoIpFormatter {
    content: Content,
    database: GeoIpDatabase,
    fields: Vec<String>,
    prefix: String,
}

impl GeoIpFormatter {
    pub fn new(content: Content, database: GeoIpDatabase, config: GeoIpConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            content,
            database,
            fields: validate_fields(&config.fields)?,
            prefix: config.prefix,
        })
    }

    pub fn from_config(cfg: &ModulatorConfig) -> Result<Self, ConfigError> {
        let config: GeoIpConfig = cfg.options_as()?;
        validate_fields(&config.fields)?;
        let Some(path) = config.database.as_deref() else {
            return Err(ConfigError::invalid_options("geoip", "a database file is required"));
        };
        let database = GeoIpDatabase::open(path)?;
        Self::new(cfg.content(), database, config)
    }
}

fn write_fields(target: &mut Metadata, record: &GeoIpRecord, fields: &[String], prefix: &str) {
    for field in fields {
        if let Some(value) = record.field(field) {
            target.set(&format!("{}{}", prefix, field), value);
        }
    }
}

impl Formatter for GeoIpFormatter {
    fn apply(&self, msg: &mut Message) -> Result<(), FormatError> {
        let text = self.content.source_string(msg);
        let record = text
            .trim()
            .parse::<IpAddr>()
            .ok()
            .and_then(|address| self.database.lookup(address))
            .ok_or_else(|| FormatError::UnresolvedAddress(text.clone()))?;

        write_fields(self.content.target_metadata(msg), &record, &self.fields, &self.prefix);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "geoip"
    }
}
