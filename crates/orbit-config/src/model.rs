// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Orbit gateway.
//!
//! Fixed sections use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! keys at startup. The `adapters` list is deliberately open: adapter
//! definitions are validated by the loaders that consume them.

use std::collections::BTreeMap;
use std::time::Duration;

use orbit_core::AdapterConfig;
use serde::{Deserialize, Serialize};

/// Top-level Orbit configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OrbitConfig {
    /// Process-wide settings and the default inference provider.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Default embedding provider for adapters without an override.
    #[serde(default)]
    pub embedding: DefaultProviderConfig,

    /// Per-provider embedding settings, keyed by provider name.
    #[serde(default)]
    pub embeddings: BTreeMap<String, ProviderModelConfig>,

    /// Default reranker provider for adapters without an override.
    #[serde(default)]
    pub reranker: RerankerConfig,

    /// Per-provider reranker settings, keyed by provider name.
    #[serde(default)]
    pub rerankers: BTreeMap<String, ProviderModelConfig>,

    /// Default vision provider.
    #[serde(default)]
    pub vision: DefaultProviderConfig,

    /// Default audio provider.
    #[serde(default)]
    pub sound: DefaultProviderConfig,

    /// Default speech-to-text provider.
    #[serde(default)]
    pub stt: DefaultProviderConfig,

    /// Default text-to-speech provider.
    #[serde(default)]
    pub tts: DefaultProviderConfig,

    /// Hot-reload and preload behavior.
    #[serde(default)]
    pub reload: ReloadConfig,

    /// Adapter definitions, in declaration order.
    #[serde(default)]
    pub adapters: Vec<AdapterConfig>,
}

impl OrbitConfig {
    /// Find the definition that takes effect for `name` (the last one declared).
    pub fn find_adapter(&self, name: &str) -> Option<&AdapterConfig> {
        self.adapters.iter().rev().find(|a| a.name() == Some(name))
    }

    /// Iterate over named, enabled adapter definitions.
    pub fn enabled_adapters(&self) -> impl Iterator<Item = &AdapterConfig> {
        self.adapters
            .iter()
            .filter(|a| a.enabled && a.name().is_some())
    }

    /// Default reranker provider, honoring `provider_override`.
    pub fn default_reranker_provider(&self) -> Option<&str> {
        self.reranker
            .provider_override
            .as_deref()
            .or(self.reranker.provider.as_deref())
    }
}

/// Process-wide settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inference provider used by adapters that do not name one.
    #[serde(default)]
    pub inference_provider: Option<String>,

    /// Log every adapter definition as it is loaded.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            inference_provider: None,
            verbose: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// A section that only names a default provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultProviderConfig {
    #[serde(default)]
    pub provider: Option<String>,
}

/// Default reranker selection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RerankerConfig {
    #[serde(default)]
    pub provider: Option<String>,

    /// Takes precedence over `provider` when set.
    #[serde(default)]
    pub provider_override: Option<String>,
}

/// Per-provider settings. Only the model takes part in cache keys; other
/// provider options (endpoints, credentials) are accepted and ignored here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProviderModelConfig {
    #[serde(default)]
    pub model: Option<String>,
}

/// Hot-reload and preload configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReloadConfig {
    /// Per-adapter construction timeout during startup preload.
    #[serde(default = "default_preload_timeout_secs")]
    pub preload_timeout_secs: u64,

    /// Maximum number of adapters constructed concurrently during preload.
    #[serde(default = "default_preload_concurrency")]
    pub preload_concurrency: usize,

    /// Timeout for rebuilding a single adapter during a reload. `None` waits
    /// for the loader indefinitely.
    #[serde(default)]
    pub rebuild_timeout_secs: Option<u64>,

    /// Watch the configuration file and reload adapters on change.
    #[serde(default = "default_watch")]
    pub watch: bool,

    /// Debounce window for file change events.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            preload_timeout_secs: default_preload_timeout_secs(),
            preload_concurrency: default_preload_concurrency(),
            rebuild_timeout_secs: None,
            watch: default_watch(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl ReloadConfig {
    pub fn preload_timeout(&self) -> Duration {
        Duration::from_secs(self.preload_timeout_secs)
    }

    pub fn rebuild_timeout(&self) -> Option<Duration> {
        self.rebuild_timeout_secs.map(Duration::from_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn default_preload_timeout_secs() -> u64 {
    120
}

fn default_preload_concurrency() -> usize {
    8
}

fn default_watch() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    500
}
