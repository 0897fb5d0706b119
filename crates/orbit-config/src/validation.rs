// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints that cannot be expressed via serde attributes.
//! Adapter definitions are only checked for name uniqueness; nameless entries
//! are tolerated here and skipped by the adapter registry.

use std::collections::HashSet;

use tracing::warn;

use crate::diagnostic::ConfigError;
use crate::model::OrbitConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &OrbitConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.general.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "general.log_level `{}` is not one of {}",
                config.general.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.reload.preload_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "reload.preload_timeout_secs must be greater than 0".to_string(),
        });
    }

    if config.reload.preload_concurrency == 0 {
        errors.push(ConfigError::Validation {
            message: "reload.preload_concurrency must be greater than 0".to_string(),
        });
    }

    if config.reload.rebuild_timeout_secs == Some(0) {
        errors.push(ConfigError::Validation {
            message: "reload.rebuild_timeout_secs must be greater than 0 when set".to_string(),
        });
    }

    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut nameless = 0usize;
    for adapter in &config.adapters {
        match adapter.name() {
            Some(name) => {
                if !seen.insert(name) && reported.insert(name) {
                    errors.push(ConfigError::DuplicateAdapter {
                        name: name.to_string(),
                    });
                }
            }
            None => nameless += 1,
        }
    }

    if nameless > 0 {
        warn!(count = nameless, "adapter entries without a name will be skipped");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_core::AdapterConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&OrbitConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = OrbitConfig::default();
        config.general.log_level = "loud".into();
        config.reload.preload_timeout_secs = 0;
        config.reload.preload_concurrency = 0;
        config.reload.rebuild_timeout_secs = Some(0);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn duplicate_adapter_reported_once() {
        let mut config = OrbitConfig::default();
        config.adapters = vec![
            AdapterConfig::named("qa-sql"),
            AdapterConfig::named("qa-sql"),
            AdapterConfig::named("qa-sql"),
            AdapterConfig::named("legacy-faq"),
        ];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            ConfigError::DuplicateAdapter { name } if name == "qa-sql"
        ));
    }

    #[test]
    fn nameless_adapters_are_not_errors() {
        let mut config = OrbitConfig::default();
        config.adapters = vec![AdapterConfig::default(), AdapterConfig::named("qa-sql")];
        assert!(validate_config(&config).is_ok());
    }
}
