// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authoritative registry of enabled adapter definitions.
//!
//! The registry is published through [`ArcSwap`] so the request-routing
//! layer can read snapshots without locking. Every mutation is a
//! read-copy-update of the whole map. Serializing *reload calls* against each
//! other is the caller's job; the registry only guarantees that each
//! individual mutation is applied atomically.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use arc_swap::ArcSwap;
use orbit_core::AdapterConfig;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::change_detector;
use crate::recording;

/// Registered adapters, keyed by name.
pub type Registry = BTreeMap<String, AdapterConfig>;

/// Counts from a [`AdapterConfigManager::load`] pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    pub enabled: usize,
    pub disabled: usize,
    /// Entries without a usable name.
    pub skipped: usize,
}

/// Result of reconciling the registry against a new adapter list.
///
/// The four sets are pairwise disjoint; together they cover every name that
/// was registered before or is enabled afterwards.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    pub updated: BTreeSet<String>,
    pub unchanged: BTreeSet<String>,
}

impl ChangeSet {
    /// True when reconciliation found nothing to do.
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

/// In-memory registry of currently enabled adapter definitions.
///
/// Invariant: never holds an adapter whose latest known definition has
/// `enabled = false`. Names last seen disabled are remembered separately so
/// that re-enabling them can be told apart from adding a new adapter.
pub struct AdapterConfigManager {
    adapters: ArcSwap<Registry>,
    disabled: ArcSwap<BTreeSet<String>>,
    verbose: bool,
}

impl AdapterConfigManager {
    pub fn new() -> Self {
        Self {
            adapters: ArcSwap::from_pointee(Registry::new()),
            disabled: ArcSwap::from_pointee(BTreeSet::new()),
            verbose: false,
        }
    }

    /// Log every definition as it is loaded.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Replace the registry with the enabled, named entries of `adapters`.
    ///
    /// Nameless entries are skipped and counted; disabled entries are counted
    /// and remembered but not stored. When a name appears more than once the
    /// last definition wins.
    pub fn load(&self, adapters: &[AdapterConfig]) -> LoadStats {
        let mut stats = LoadStats::default();
        let mut registry = Registry::new();
        let mut disabled = BTreeSet::new();

        for cfg in adapters {
            let Some(name) = cfg.name() else {
                stats.skipped += 1;
                continue;
            };

            if cfg.enabled {
                stats.enabled += 1;
                disabled.remove(name);
                if self.verbose {
                    info!(
                        adapter = name,
                        inference_provider = cfg.inference_provider.as_deref().unwrap_or("default"),
                        "loaded adapter config"
                    );
                }
                registry.insert(name.to_string(), cfg.clone());
            } else {
                stats.disabled += 1;
                registry.remove(name);
                if self.verbose {
                    info!(adapter = name, "skipping disabled adapter");
                }
                disabled.insert(name.to_string());
            }
        }

        if stats.skipped > 0 {
            warn!(count = stats.skipped, "skipped adapter entries without a name");
        }
        info!(
            enabled = stats.enabled,
            disabled = stats.disabled,
            "loaded adapter configurations"
        );

        recording::set_registered_adapters(registry.len());
        self.adapters.store(Arc::new(registry));
        self.disabled.store(Arc::new(disabled));
        stats
    }

    pub fn get(&self, name: &str) -> Option<AdapterConfig> {
        self.adapters.load().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adapters.load().contains_key(name)
    }

    /// Register or replace the definition for `name`.
    ///
    /// A definition with `enabled = false` is not stored; the name is marked
    /// disabled and any registered definition is dropped instead.
    pub fn put(&self, name: &str, config: AdapterConfig) {
        if !config.enabled {
            warn!(adapter = name, "refusing to register a disabled adapter, marking it disabled");
            self.remove(name);
            self.mark_disabled(name);
            return;
        }

        self.adapters.rcu(|current| {
            let mut next = Registry::clone(current);
            next.insert(name.to_string(), config.clone());
            next
        });
        self.clear_disabled(name);
        recording::set_registered_adapters(self.len());
        debug!(adapter = name, "registered adapter config");
    }

    /// Remove the definition for `name`, returning the prior one.
    pub fn remove(&self, name: &str) -> Option<AdapterConfig> {
        if !self.contains(name) {
            return None;
        }
        let previous = self.adapters.rcu(|current| {
            let mut next = Registry::clone(current);
            next.remove(name);
            next
        });
        recording::set_registered_adapters(self.len());
        previous.get(name).cloned()
    }

    /// Remember that the latest definition of `name` is disabled.
    pub fn mark_disabled(&self, name: &str) {
        self.disabled.rcu(|current| {
            let mut next = BTreeSet::clone(current);
            next.insert(name.to_string());
            next
        });
    }

    /// Whether the latest known definition of `name` was disabled.
    pub fn was_disabled(&self, name: &str) -> bool {
        self.disabled.load().contains(name)
    }

    fn clear_disabled(&self, name: &str) {
        if self.was_disabled(name) {
            self.disabled.rcu(|current| {
                let mut next = BTreeSet::clone(current);
                next.remove(name);
                next
            });
        }
    }

    /// Registered adapter names, sorted.
    pub fn adapter_names(&self) -> Vec<String> {
        self.adapters.load().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.load().is_empty()
    }

    /// A consistent, lock-free view of the registry at this instant.
    pub fn snapshot(&self) -> Arc<Registry> {
        self.adapters.load_full()
    }

    /// Compare the registry against `new_adapters` and replace it wholesale.
    ///
    /// Only the registry changes: caches and live instances are left to the
    /// caller.
    pub fn reconcile(&self, new_adapters: &[AdapterConfig]) -> ChangeSet {
        let current = self.adapters.load_full();
        let mut next = Registry::new();
        let mut disabled = BTreeSet::new();
        let mut skipped = 0usize;

        for cfg in new_adapters {
            let Some(name) = cfg.name() else {
                skipped += 1;
                continue;
            };
            if cfg.enabled {
                disabled.remove(name);
                next.insert(name.to_string(), cfg.clone());
            } else {
                next.remove(name);
                disabled.insert(name.to_string());
            }
        }

        if skipped > 0 {
            warn!(count = skipped, "skipped adapter entries without a name during reconcile");
        }

        let mut changes = ChangeSet::default();
        for (name, cfg) in &next {
            match current.get(name) {
                None => changes.added.insert(name.clone()),
                Some(old) if change_detector::differs(old, cfg) => {
                    changes.updated.insert(name.clone())
                }
                Some(_) => changes.unchanged.insert(name.clone()),
            };
        }
        for name in current.keys() {
            if !next.contains_key(name) {
                changes.removed.insert(name.clone());
            }
        }

        info!(
            added = changes.added.len(),
            removed = changes.removed.len(),
            updated = changes.updated.len(),
            unchanged = changes.unchanged.len(),
            "reconciled adapter configurations"
        );

        recording::set_registered_adapters(next.len());
        self.adapters.store(Arc::new(next));
        self.disabled.store(Arc::new(disabled));
        changes
    }
}

impl Default for AdapterConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapters() -> Vec<AdapterConfig> {
        vec![
            AdapterConfig::named("qa-sql").with_inference("ollama", Some("llama3")),
            AdapterConfig::named("legacy-faq").with_embedding("ollama"),
            AdapterConfig::named("vision-docs").with_enabled(false),
            AdapterConfig::default(),
        ]
    }

    #[test]
    fn load_counts_and_skips() {
        let manager = AdapterConfigManager::new();
        let stats = manager.load(&adapters());

        assert_eq!(
            stats,
            LoadStats {
                enabled: 2,
                disabled: 1,
                skipped: 1
            }
        );
        assert_eq!(manager.adapter_names(), vec!["legacy-faq", "qa-sql"]);
        assert!(!manager.contains("vision-docs"));
        assert!(manager.was_disabled("vision-docs"));
    }

    #[test]
    fn load_last_definition_wins() {
        let manager = AdapterConfigManager::new();
        manager.load(&[
            AdapterConfig::named("qa-sql"),
            AdapterConfig::named("qa-sql").with_enabled(false),
        ]);
        assert!(manager.is_empty());
        assert!(manager.was_disabled("qa-sql"));
    }

    #[test]
    fn put_get_remove_roundtrip() {
        let manager = AdapterConfigManager::new();
        assert_eq!(manager.remove("qa-sql"), None);

        let cfg = AdapterConfig::named("qa-sql").with_inference("ollama", None);
        manager.put("qa-sql", cfg.clone());
        assert_eq!(manager.get("qa-sql"), Some(cfg.clone()));
        assert_eq!(manager.len(), 1);

        assert_eq!(manager.remove("qa-sql"), Some(cfg));
        assert!(manager.get("qa-sql").is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn put_clears_disabled_mark() {
        let manager = AdapterConfigManager::new();
        manager.mark_disabled("qa-sql");
        manager.put("qa-sql", AdapterConfig::named("qa-sql"));
        assert!(!manager.was_disabled("qa-sql"));
    }

    #[test]
    fn put_refuses_disabled_definition() {
        let manager = AdapterConfigManager::new();
        manager.put("qa-sql", AdapterConfig::named("qa-sql"));
        manager.put("qa-sql", AdapterConfig::named("qa-sql").with_enabled(false));
        assert!(!manager.contains("qa-sql"));
        assert!(manager.was_disabled("qa-sql"));
    }

    #[test]
    fn snapshot_is_not_affected_by_later_writes() {
        let manager = AdapterConfigManager::new();
        manager.put("qa-sql", AdapterConfig::named("qa-sql"));
        let snapshot = manager.snapshot();
        manager.remove("qa-sql");
        assert!(snapshot.contains_key("qa-sql"));
        assert!(manager.is_empty());
    }

    #[test]
    fn reconcile_classifies_every_name() {
        let manager = AdapterConfigManager::new();
        manager.load(&adapters());

        let new = vec![
            AdapterConfig::named("qa-sql").with_inference("ollama", Some("llama3.1")),
            AdapterConfig::named("vision-docs").with_vision("openai"),
            AdapterConfig::named("support-bot"),
            AdapterConfig::named("legacy-faq").with_enabled(false),
        ];
        let changes = manager.reconcile(&new);

        assert_eq!(changes.updated, BTreeSet::from(["qa-sql".to_string()]));
        assert_eq!(
            changes.added,
            BTreeSet::from(["support-bot".to_string(), "vision-docs".to_string()])
        );
        assert_eq!(changes.removed, BTreeSet::from(["legacy-faq".to_string()]));
        assert!(changes.unchanged.is_empty());

        assert_eq!(
            manager.adapter_names(),
            vec!["qa-sql", "support-bot", "vision-docs"]
        );
        assert!(manager.was_disabled("legacy-faq"));
        assert!(!manager.was_disabled("vision-docs"));
    }

    #[test]
    fn reconcile_same_config_is_noop() {
        let manager = AdapterConfigManager::new();
        manager.load(&adapters());
        let changes = manager.reconcile(&adapters());
        assert!(changes.is_noop());
        assert_eq!(changes.unchanged.len(), 2);
    }
}
