// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dependent cache that records every call made against it.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashSet;
use orbit_core::DependencyCache;

/// Key-only dependent cache with call counters.
///
/// Keys are `provider` or `provider:model`. Prefix removal is only honored
/// when enabled, matching caches that keep model-qualified variants.
#[derive(Default)]
pub struct RecordingDependencyCache {
    keys: DashSet<String>,
    prefix_removal: bool,
    contains_calls: AtomicUsize,
    remove_calls: AtomicUsize,
    prefix_calls: AtomicUsize,
}

impl RecordingDependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that supports prefix removal, like the provider cache.
    pub fn with_prefix_removal() -> Self {
        Self {
            prefix_removal: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, key: &str) {
        self.keys.insert(key.to_string());
    }

    /// Cached keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.keys.iter().map(|k| k.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn contains_calls(&self) -> usize {
        self.contains_calls.load(Ordering::SeqCst)
    }

    pub fn remove_calls(&self) -> usize {
        self.remove_calls.load(Ordering::SeqCst)
    }

    pub fn prefix_calls(&self) -> usize {
        self.prefix_calls.load(Ordering::SeqCst)
    }

    /// Calls that could have mutated the cache.
    pub fn mutation_calls(&self) -> usize {
        self.remove_calls() + self.prefix_calls()
    }

    /// Every recorded call, reads included.
    pub fn total_calls(&self) -> usize {
        self.contains_calls() + self.mutation_calls()
    }
}

#[async_trait]
impl DependencyCache for RecordingDependencyCache {
    fn build_cache_key(&self, provider: &str, model: Option<&str>) -> String {
        match model {
            Some(model) => format!("{provider}:{model}"),
            None => provider.to_string(),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.contains_calls.fetch_add(1, Ordering::SeqCst);
        self.keys.contains(key)
    }

    async fn remove(&self, key: &str) -> bool {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        self.keys.remove(key).is_some()
    }

    async fn remove_by_prefix(&self, prefix: &str) -> Vec<String> {
        self.prefix_calls.fetch_add(1, Ordering::SeqCst);
        if !self.prefix_removal {
            return Vec::new();
        }
        let qualified = format!("{prefix}:");
        let mut removed: Vec<String> = self
            .keys()
            .into_iter()
            .filter(|k| k == prefix || k.starts_with(&qualified))
            .collect();
        removed.retain(|k| self.keys.remove(k).is_some());
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_calls() {
        let cache = RecordingDependencyCache::with_prefix_removal();
        cache.insert("ollama:llama3");
        cache.insert("ollama:mistral");

        assert!(cache.contains("ollama:llama3"));
        assert!(cache.remove("ollama:llama3").await);
        assert_eq!(cache.remove_by_prefix("ollama").await, vec!["ollama:mistral"]);

        assert_eq!(cache.contains_calls(), 1);
        assert_eq!(cache.mutation_calls(), 2);
        assert!(cache.keys().is_empty());
    }

    #[tokio::test]
    async fn prefix_removal_is_opt_in() {
        let cache = RecordingDependencyCache::new();
        cache.insert("openai:large");
        assert!(cache.remove_by_prefix("openai").await.is_empty());
        assert_eq!(cache.keys(), vec!["openai:large"]);
    }
}
