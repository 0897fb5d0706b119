// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared per-kind resource caches (provider clients, embedders, rerankers, ...).

use async_trait::async_trait;

/// A cache of live clients for one [`DependencyKind`](crate::types::DependencyKind).
///
/// Keys are derived from (provider, model) by [`build_cache_key`](Self::build_cache_key)
/// and must be stable for the lifetime of the process.
#[async_trait]
pub trait DependencyCache: Send + Sync {
    /// Build the canonical key for a provider and optional model.
    fn build_cache_key(&self, provider: &str, model: Option<&str>) -> String;

    fn contains(&self, key: &str) -> bool;

    /// Remove the entry for `key`, releasing whatever it holds (store
    /// connections, datasource pool references). Returns true if something
    /// was removed.
    async fn remove(&self, key: &str) -> bool;

    /// Remove every entry whose key starts with `prefix`, returning the removed keys.
    ///
    /// Only the inference provider cache keeps model-qualified variants, so
    /// the default implementation removes nothing.
    async fn remove_by_prefix(&self, _prefix: &str) -> Vec<String> {
        Vec::new()
    }
}
