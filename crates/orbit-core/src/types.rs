// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the configuration, reload, and serving layers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Kinds of shared resources an adapter depends on.
///
/// Each kind has its own dependent cache, keyed by provider (and model where
/// one applies). Entries are shared by every adapter that references the same
/// provider/model pair. `Store` entries are keyed by vector store name and
/// `Datasource` entries by datasource plus optional database override.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Provider,
    Embedding,
    Reranker,
    Vision,
    Audio,
    Store,
    Datasource,
}

/// Outcome of reloading a single adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReloadAction {
    Added,
    Updated,
    Enabled,
    Disabled,
    Unchanged,
}

/// Definition of one adapter as supplied by the operator.
///
/// The shape is externally validated; only the fields the reload machinery
/// reasons about are typed. Anything else is kept verbatim in `extra` so that
/// no change goes unnoticed when two definitions are compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Unique adapter name. Entries without one are skipped by the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Whether the adapter should be served. Defaults to `true` when omitted.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Adapter-type descriptor (e.g. `qa`, `intent`, `passthrough`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,

    /// Retrieval datasource (e.g. `sqlite`, `postgres`, `qdrant`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<String>,

    /// Implementation path of the retriever backing this adapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_provider: Option<String>,

    /// Model override for the inference provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reranker_provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision_provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_provider: Option<String>,

    /// Speech-to-text provider; served from the audio cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stt_provider: Option<String>,

    /// Text-to-speech provider; served from the audio cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tts_provider: Option<String>,

    /// Arbitrary nested adapter options.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,

    /// Any further keys present in the definition.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            name: None,
            enabled: default_enabled(),
            adapter: None,
            datasource: None,
            implementation: None,
            inference_provider: None,
            model: None,
            embedding_provider: None,
            reranker_provider: None,
            vision_provider: None,
            audio_provider: None,
            stt_provider: None,
            tts_provider: None,
            config: Map::new(),
            extra: Map::new(),
        }
    }
}

impl AdapterConfig {
    /// Create an enabled definition with the given name and nothing else set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns the adapter name, treating an empty or blank name as absent.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// Set the inference provider and optional model override.
    pub fn with_inference(mut self, provider: &str, model: Option<&str>) -> Self {
        self.inference_provider = Some(provider.to_string());
        self.model = model.map(str::to_string);
        self
    }

    pub fn with_embedding(mut self, provider: &str) -> Self {
        self.embedding_provider = Some(provider.to_string());
        self
    }

    pub fn with_reranker(mut self, provider: &str) -> Self {
        self.reranker_provider = Some(provider.to_string());
        self
    }

    pub fn with_vision(mut self, provider: &str) -> Self {
        self.vision_provider = Some(provider.to_string());
        self
    }

    pub fn with_audio(mut self, provider: &str) -> Self {
        self.audio_provider = Some(provider.to_string());
        self
    }

    pub fn with_datasource(mut self, datasource: &str) -> Self {
        self.datasource = Some(datasource.to_string());
        self
    }

    /// Insert a nested option under `config`.
    pub fn with_option(mut self, key: &str, value: Value) -> Self {
        self.config.insert(key.to_string(), value);
        self
    }

    /// A string-valued nested option under `config`.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }

    /// Database override for the datasource, kept as an extra key.
    pub fn database(&self) -> Option<&str> {
        self.extra.get("database").and_then(Value::as_str)
    }

    /// Set the `enabled` flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
