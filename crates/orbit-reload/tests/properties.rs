// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for change detection, reconciliation and cache keys.

use std::collections::{BTreeMap, BTreeSet};

use orbit_core::{AdapterConfig, DependencyCache, DependencyKind};
use orbit_reload::{AdapterConfigManager, ClientCache, differs};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn options() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map("[a-d]", 0..100i64, 0..4).prop_map(|m| {
        m.into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect()
    })
}

fn adapter() -> impl Strategy<Value = AdapterConfig> {
    (
        "[a-e]",
        any::<bool>(),
        prop::option::of("(ollama|openai|groq)"),
        prop::option::of("(llama3|llama3.1|gpt-4o)"),
        prop::option::of("(sqlite|qdrant)"),
        options(),
    )
        .prop_map(|(name, enabled, provider, model, datasource, config)| {
            let mut cfg = AdapterConfig::named(name).with_enabled(enabled);
            cfg.inference_provider = provider;
            cfg.model = model;
            cfg.datasource = datasource;
            cfg.config = config;
            cfg
        })
}

proptest! {
    #[test]
    fn differs_is_irreflexive(cfg in adapter()) {
        prop_assert!(!differs(&cfg, &cfg.clone()));
    }

    #[test]
    fn differs_is_symmetric(a in adapter(), b in adapter()) {
        prop_assert_eq!(differs(&a, &b), differs(&b, &a));
    }

    #[test]
    fn differs_matches_structural_equality(a in adapter(), b in adapter()) {
        prop_assert_eq!(differs(&a, &b), a != b);
    }
}

proptest! {
    #[test]
    fn reconcile_partitions_names(
        old in prop::collection::vec(adapter(), 0..8),
        new in prop::collection::vec(adapter(), 0..8),
    ) {
        let manager = AdapterConfigManager::new();
        manager.load(&old);
        let before: BTreeSet<String> = manager.adapter_names().into_iter().collect();

        let changes = manager.reconcile(&new);

        let mut latest: BTreeMap<String, bool> = BTreeMap::new();
        for cfg in &new {
            if let Some(name) = cfg.name() {
                latest.insert(name.to_string(), cfg.enabled);
            }
        }
        let enabled_new: BTreeSet<String> = latest
            .into_iter()
            .filter_map(|(name, enabled)| enabled.then_some(name))
            .collect();

        let sets = [&changes.added, &changes.removed, &changes.updated, &changes.unchanged];
        let total: usize = sets.iter().map(|s| s.len()).sum();
        let union: BTreeSet<String> = sets.iter().flat_map(|s| s.iter().cloned()).collect();
        prop_assert_eq!(total, union.len(), "sets overlap");

        let expected: BTreeSet<String> = before.union(&enabled_new).cloned().collect();
        prop_assert_eq!(union, expected);

        let after: BTreeSet<String> = manager.adapter_names().into_iter().collect();
        prop_assert_eq!(after, enabled_new);
    }
}

proptest! {
    #[test]
    fn cache_keys_are_deterministic(
        provider in "[a-z]{1,8}",
        model in prop::option::of("[a-z0-9.]{1,8}"),
    ) {
        let cache: ClientCache<()> = ClientCache::new(DependencyKind::Provider);
        prop_assert_eq!(
            cache.build_cache_key(&provider, model.as_deref()),
            cache.build_cache_key(&provider, model.as_deref())
        );
    }

    #[test]
    fn cache_keys_distinguish_models(
        provider in "[a-z]{1,8}",
        a in "[a-z0-9.]{1,8}",
        b in "[a-z0-9.]{1,8}",
    ) {
        prop_assume!(a != b);
        let cache: ClientCache<()> = ClientCache::new(DependencyKind::Provider);
        prop_assert_ne!(
            cache.build_cache_key(&provider, Some(&a)),
            cache.build_cache_key(&provider, Some(&b))
        );
        prop_assert_ne!(
            cache.build_cache_key(&provider, Some(&a)),
            cache.build_cache_key(&provider, None)
        );
    }
}
