// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stateless comparison utilities over two adapter definitions.
//!
//! [`differs`] is the authoritative equality check used by reconciliation.
//! [`detect_changes`] and [`affected_dependent_kinds`] are reporting aids.

use std::collections::BTreeSet;

use orbit_core::{AdapterConfig, DependencyKind, OrbitError};
use serde_json::{Map, Value};
use tracing::error;

/// Nested option differences listed individually before summarizing the rest.
const MAX_NESTED_CHANGES: usize = 3;

type FieldAccessor = fn(&AdapterConfig) -> Option<&str>;

/// Top-level fields reported by [`detect_changes`], in report order.
const KEY_FIELDS: &[(&str, FieldAccessor)] = &[
    ("inference_provider", |c| c.inference_provider.as_deref()),
    ("model", |c| c.model.as_deref()),
    ("embedding_provider", |c| c.embedding_provider.as_deref()),
    ("reranker_provider", |c| c.reranker_provider.as_deref()),
    ("vision_provider", |c| c.vision_provider.as_deref()),
    ("audio_provider", |c| c.audio_provider.as_deref()),
    ("stt_provider", |c| c.stt_provider.as_deref()),
    ("tts_provider", |c| c.tts_provider.as_deref()),
    ("datasource", |c| c.datasource.as_deref()),
    ("adapter", |c| c.adapter.as_deref()),
    ("implementation", |c| c.implementation.as_deref()),
];

/// Serialize an adapter definition with every object's keys sorted.
pub fn canonical_json(config: &AdapterConfig) -> Result<String, OrbitError> {
    let value = serde_json::to_value(config)?;
    Ok(canonicalize(value).to_string())
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Returns true if the two definitions are meaningfully different.
///
/// Key order inside nested maps never counts as a change. If either side
/// cannot be serialized the failure is logged and the definitions are
/// compared structurally instead.
pub fn differs(old: &AdapterConfig, new: &AdapterConfig) -> bool {
    match (canonical_json(old), canonical_json(new)) {
        (Ok(a), Ok(b)) => a != b,
        (Err(e), _) | (_, Err(e)) => {
            error!(
                adapter = new.name().or(old.name()).unwrap_or("<unnamed>"),
                error = %e,
                "failed to serialize adapter config for comparison, falling back to structural comparison"
            );
            old != new
        }
    }
}

/// Human-readable list of differences between two definitions.
///
/// Key fields are reported first, then nested option differences (capped,
/// with a summary line for the remainder).
pub fn detect_changes(old: &AdapterConfig, new: &AdapterConfig) -> Vec<String> {
    let mut changes = Vec::new();

    if old.enabled != new.enabled {
        changes.push(format!("enabled: {} -> {}", old.enabled, new.enabled));
    }

    for (field, get) in KEY_FIELDS {
        let (before, after) = (get(old), get(new));
        if before != after {
            changes.push(format!(
                "{field}: {} -> {}",
                before.unwrap_or("(none)"),
                after.unwrap_or("(none)")
            ));
        }
    }

    let mut nested = map_differences("config.", &old.config, &new.config);
    nested.extend(map_differences("", &old.extra, &new.extra));

    let hidden = nested.len().saturating_sub(MAX_NESTED_CHANGES);
    changes.extend(nested.into_iter().take(MAX_NESTED_CHANGES));
    if hidden > 0 {
        changes.push(format!("... +{hidden} more config changes"));
    }

    changes
}

fn map_differences(prefix: &str, old: &Map<String, Value>, new: &Map<String, Value>) -> Vec<String> {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    keys.into_iter()
        .filter_map(|key| match (old.get(key), new.get(key)) {
            (Some(a), Some(b)) if a == b => None,
            (Some(a), Some(b)) => Some(format!("{prefix}{key}: {a} -> {b}")),
            (Some(_), None) => Some(format!("{prefix}{key}: removed")),
            (None, Some(b)) => Some(format!("{prefix}{key}: added ({b})")),
            (None, None) => None,
        })
        .collect()
}

/// Dependent resources touched by a definition change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffectedDependencies {
    /// Kinds whose provider (or model, store, datasource) changed.
    pub kinds: BTreeSet<DependencyKind>,
    /// Set when options, datasource, or adapter type changed: every resource
    /// the adapter holds must be treated as stale.
    pub whole_adapter: bool,
}

impl AffectedDependencies {
    pub fn is_empty(&self) -> bool {
        !self.whole_adapter && self.kinds.is_empty()
    }

    /// Whether resources of `kind` must be considered stale.
    pub fn affects(&self, kind: DependencyKind) -> bool {
        self.whole_adapter || self.kinds.contains(&kind)
    }
}

/// Determine which dependent caches a definition change affects.
pub fn affected_dependent_kinds(old: &AdapterConfig, new: &AdapterConfig) -> AffectedDependencies {
    let mut affected = AffectedDependencies::default();

    if old.inference_provider != new.inference_provider || old.model != new.model {
        affected.kinds.insert(DependencyKind::Provider);
    }
    if old.embedding_provider != new.embedding_provider {
        affected.kinds.insert(DependencyKind::Embedding);
    }
    if old.reranker_provider != new.reranker_provider {
        affected.kinds.insert(DependencyKind::Reranker);
    }
    if old.vision_provider != new.vision_provider {
        affected.kinds.insert(DependencyKind::Vision);
    }
    if old.audio_provider != new.audio_provider
        || old.stt_provider != new.stt_provider
        || old.tts_provider != new.tts_provider
    {
        affected.kinds.insert(DependencyKind::Audio);
    }
    if ["store_name", "vector_store"]
        .iter()
        .any(|key| old.option_str(key) != new.option_str(key))
    {
        affected.kinds.insert(DependencyKind::Store);
    }
    if old.datasource != new.datasource || old.database() != new.database() {
        affected.kinds.insert(DependencyKind::Datasource);
    }

    affected.whole_adapter = old.config != new.config
        || old.datasource != new.datasource
        || old.adapter != new.adapter
        || old.implementation != new.implementation
        || old.extra != new.extra;

    affected
}
