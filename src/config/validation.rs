// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation for modulator pipelines.
//!
//! Validation runs before any formatter is built so that every problem in a config
//! file is reported at once instead of failing on the first bad modulator.
//!
//! # Checks
//!
//! 1. **Known formatters**: every `type` names a registered formatter. Nested
//!    modulator lists inside `options` (as used by `aggregate`, `double` and
//!    `metadata_copy`) are searched recursively.
//! 2. **Unique ids**: explicitly configured top level ids do not repeat.
//! 3. **Executor options**: `max_concurrency` is at least 1.
//!
//! Option values themselves are checked later, when `FormatterFactory` deserializes
//! them into each formatter's option struct.
//!
//! # Example
//! ```rust
//! use the_modulator::config::{parse_config, validate_config, ConfigFormat};
//!
//! let config = parse_config(
//!     "modulators:\n  - type: envelope\n  - type: frobnicate\n",
//!     ConfigFormat::Yaml,
//! )
//! .unwrap();
//!
//! let errors = validate_config(&config).unwrap_err();
//! assert_eq!(errors.len(), 1);
//! assert!(errors[0].to_string().contains("frobnicate"));
//! ```

use std::collections::HashSet;

use crate::config::Config;
use crate::errors::ValidationError;
use crate::formatters::FormatterFactory;

const TYPE_KEY: &str = "type";
const OPTIONS_KEY: &str = "options";

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_unique_ids(config, &mut errors);
    validate_executor_options(config, &mut errors);

    for (index, modulator) in config.modulators.iter().enumerate() {
        let location = index.to_string();
        check_formatter(&modulator.formatter, &location, &mut errors);
        for (key, value) in &modulator.options {
            validate_nested(value, &format!("{}.{}", location, key), &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_unique_ids(config: &Config, errors: &mut Vec<ValidationError>) {
    let mut seen = HashSet::new();
    for id in config.modulators.iter().filter_map(|m| m.id.as_ref()) {
        if !seen.insert(id) {
            errors.push(ValidationError::DuplicateModulatorId {
                modulator_id: id.clone(),
            });
        }
    }
}

fn validate_executor_options(config: &Config, errors: &mut Vec<ValidationError>) {
    if config.executor_options.max_concurrency == Some(0) {
        errors.push(ValidationError::InvalidExecutorOption {
            option: "max_concurrency".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn check_formatter(formatter: &str, location: &str, errors: &mut Vec<ValidationError>) {
    if !FormatterFactory::is_formatter_available(formatter) {
        errors.push(ValidationError::UnknownFormatter {
            location: location.to_string(),
            formatter: formatter.to_string(),
        });
    }
}

/// Walk an option value looking for embedded modulator configs, i.e. mappings that
/// carry a string `type` key.
fn validate_nested(value: &serde_yaml::Value, location: &str, errors: &mut Vec<ValidationError>) {
    match value {
        serde_yaml::Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                validate_nested(item, &format!("{}.{}", location, index), errors);
            }
        }
        serde_yaml::Value::Mapping(mapping) => {
            if let Some(formatter) = mapping.get(TYPE_KEY).and_then(|t| t.as_str()) {
                check_formatter(formatter, location, errors);
                if let Some(options) = mapping.get(OPTIONS_KEY) {
                    validate_nested(options, location, errors);
                }
                return;
            }
            for (key, nested) in mapping {
                let key = key.as_str().unwrap_or("?");
                validate_nested(nested, &format!("{}.{}", location, key), errors);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, ConfigFormat};

    fn validate(yaml: &str) -> Result<(), Vec<ValidationError>> {
        validate_config(&parse_config(yaml, ConfigFormat::Yaml).unwrap())
    }

    #[test]
    fn valid_pipeline_passes() {
        let yaml = r#"
modulators:
  - id: a
    type: envelope
  - id: b
    type: double
    options:
      left:
        - type: base64_encode
      right:
        - type: forward
"#;
        assert!(validate(yaml).is_ok());
    }

    #[test]
    fn nested_unknown_formatter_reports_location() {
        let yaml = r#"
modulators:
  - type: aggregate
    options:
      modulators:
        - type: envelope
        - type: mystery
"#;
        let errors = validate(yaml).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnknownFormatter {
                location: "0.modulators.1".to_string(),
                formatter: "mystery".to_string(),
            }]
        );
    }

    #[test]
    fn metadata_copy_targets_are_searched() {
        let yaml = r#"
modulators:
  - type: metadata_copy
    options:
      write_to:
        - plain_key
        - encoded:
            - type: base64_encode
            - type: nope
"#;
        let errors = validate(yaml).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("nope"));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let yaml = r#"
modulators:
  - id: same
    type: forward
  - id: same
    type: forward
"#;
        let errors = validate(yaml).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateModulatorId {
                modulator_id: "same".to_string()
            }]
        );
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let yaml = "executor_options:\n  max_concurrency: 0\n";
        let errors = validate(yaml).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::InvalidExecutorOption { .. }
        ));
    }
}
