// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory cache implementations backed by `DashMap`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use orbit_core::{AdapterCache, AdapterInstance, DependencyCache, DependencyKind};
use tracing::{debug, warn};

/// Name-keyed cache of live adapter instances.
#[derive(Default)]
pub struct InMemoryAdapterCache {
    instances: DashMap<String, Arc<dyn AdapterInstance>>,
}

impl InMemoryAdapterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of every cached instance, sorted.
    pub fn cached_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.instances.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Evict and shut down every cached instance.
    pub async fn clear(&self) {
        for name in self.cached_names() {
            AdapterCache::remove(self, &name).await;
        }
    }
}

#[async_trait]
impl AdapterCache for InMemoryAdapterCache {
    fn contains(&self, name: &str) -> bool {
        self.instances.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<Arc<dyn AdapterInstance>> {
        self.instances.get(name).map(|e| Arc::clone(e.value()))
    }

    fn put(&self, name: &str, instance: Arc<dyn AdapterInstance>) {
        self.instances.insert(name.to_string(), instance);
    }

    async fn remove(&self, name: &str) -> Option<Arc<dyn AdapterInstance>> {
        let (_, instance) = self.instances.remove(name)?;
        if let Err(e) = instance.shutdown().await {
            warn!(adapter = name, error = %e, "adapter shutdown failed during eviction");
        }
        debug!(adapter = name, "evicted adapter instance");
        Some(instance)
    }
}

/// Shared cache of live clients for one dependency kind.
///
/// Keys are `provider` or `provider:model`. Callers resolve the model
/// (including any configured default) before building a key, so a key is a
/// pure function of its inputs.
pub struct ClientCache<T> {
    kind: DependencyKind,
    clients: DashMap<String, Arc<T>>,
}

impl<T> ClientCache<T>
where
    T: Send + Sync + 'static,
{
    pub fn new(kind: DependencyKind) -> Self {
        Self {
            kind,
            clients: DashMap::new(),
        }
    }

    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.clients.get(key).map(|e| Arc::clone(e.value()))
    }

    /// Return the client for `key`, building it with `build` on a miss.
    ///
    /// `build` runs without holding any shard lock, so it may read this
    /// cache. When two callers race on the same key both may build; the
    /// first insert wins and the other client is dropped.
    pub fn get_or_insert_with<F>(&self, key: &str, build: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        if let Some(existing) = self.get(key) {
            return existing;
        }
        let built = Arc::new(build());
        let entry = self.clients.entry(key.to_string()).or_insert(built);
        Arc::clone(entry.value())
    }

    pub fn put(&self, key: &str, client: Arc<T>) {
        self.clients.insert(key.to_string(), client);
    }

    /// Cached keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.clients.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn clear(&self) {
        self.clients.clear();
    }
}

impl<T> fmt::Debug for ClientCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCache")
            .field("kind", &self.kind)
            .field("entries", &self.clients.len())
            .finish()
    }
}

#[async_trait]
impl<T> DependencyCache for ClientCache<T>
where
    T: Send + Sync + 'static,
{
    fn build_cache_key(&self, provider: &str, model: Option<&str>) -> String {
        match model {
            Some(model) if !model.is_empty() => format!("{provider}:{model}"),
            _ => provider.to_string(),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.clients.contains_key(key)
    }

    async fn remove(&self, key: &str) -> bool {
        self.clients.remove(key).is_some()
    }

    async fn remove_by_prefix(&self, prefix: &str) -> Vec<String> {
        let qualified = format!("{prefix}:");
        let matching: Vec<String> = self
            .clients
            .iter()
            .filter(|e| e.key() == prefix || e.key().starts_with(&qualified))
            .map(|e| e.key().clone())
            .collect();

        let mut removed: Vec<String> = matching
            .into_iter()
            .filter(|key| self.clients.remove(key).is_some())
            .collect();
        removed.sort();
        removed
    }
}

/// The dependent caches wired into a deployment, one optional handle per kind.
#[derive(Clone, Default)]
pub struct DependencyCaches {
    pub provider: Option<Arc<dyn DependencyCache>>,
    pub embedding: Option<Arc<dyn DependencyCache>>,
    pub reranker: Option<Arc<dyn DependencyCache>>,
    pub vision: Option<Arc<dyn DependencyCache>>,
    pub audio: Option<Arc<dyn DependencyCache>>,
    pub store: Option<Arc<dyn DependencyCache>>,
    pub datasource: Option<Arc<dyn DependencyCache>>,
}

impl DependencyCaches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire `cache` as the cache for `kind`.
    pub fn with(mut self, kind: DependencyKind, cache: Arc<dyn DependencyCache>) -> Self {
        *self.slot_mut(kind) = Some(cache);
        self
    }

    pub fn get(&self, kind: DependencyKind) -> Option<&Arc<dyn DependencyCache>> {
        match kind {
            DependencyKind::Provider => self.provider.as_ref(),
            DependencyKind::Embedding => self.embedding.as_ref(),
            DependencyKind::Reranker => self.reranker.as_ref(),
            DependencyKind::Vision => self.vision.as_ref(),
            DependencyKind::Audio => self.audio.as_ref(),
            DependencyKind::Store => self.store.as_ref(),
            DependencyKind::Datasource => self.datasource.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: DependencyKind) -> &mut Option<Arc<dyn DependencyCache>> {
        match kind {
            DependencyKind::Provider => &mut self.provider,
            DependencyKind::Embedding => &mut self.embedding,
            DependencyKind::Reranker => &mut self.reranker,
            DependencyKind::Vision => &mut self.vision,
            DependencyKind::Audio => &mut self.audio,
            DependencyKind::Store => &mut self.store,
            DependencyKind::Datasource => &mut self.datasource,
        }
    }
}

impl fmt::Debug for DependencyCaches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use strum::IntoEnumIterator;

        let wired: Vec<DependencyKind> = DependencyKind::iter()
            .filter(|kind| self.get(*kind).is_some())
            .collect();
        f.debug_struct("DependencyCaches")
            .field("wired", &wired)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_keys_with_and_without_model() {
        let cache: ClientCache<String> = ClientCache::new(DependencyKind::Provider);
        assert_eq!(cache.build_cache_key("ollama", None), "ollama");
        assert_eq!(
            cache.build_cache_key("ollama", Some("llama3")),
            "ollama:llama3"
        );
        assert_eq!(cache.build_cache_key("ollama", Some("")), "ollama");
    }

    #[test]
    fn get_or_insert_builds_once() {
        let cache: ClientCache<String> = ClientCache::new(DependencyKind::Vision);
        let first = cache.get_or_insert_with("gemini", || "client-1".to_string());
        let second = cache.get_or_insert_with("gemini", || "client-2".to_string());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn builder_may_read_the_same_cache() {
        let cache: ClientCache<String> = ClientCache::new(DependencyKind::Store);
        cache.put("orders", Arc::new("orders-store".into()));

        let derived = cache.get_or_insert_with("orders-archive", || {
            let base = cache.get("orders").map(|c| c.to_string()).unwrap_or_default();
            format!("{base}-archive")
        });

        assert_eq!(derived.as_str(), "orders-store-archive");
        assert_eq!(cache.keys(), vec!["orders", "orders-archive"]);
    }

    #[tokio::test]
    async fn remove_by_prefix_matches_bare_and_qualified_keys() {
        let cache: ClientCache<String> = ClientCache::new(DependencyKind::Provider);
        for key in ["ollama", "ollama:llama3", "ollama:mistral", "ollama_cloud", "openai:gpt-4o"] {
            cache.put(key, Arc::new(key.to_string()));
        }

        let removed = cache.remove_by_prefix("ollama").await;
        assert_eq!(removed, vec!["ollama", "ollama:llama3", "ollama:mistral"]);
        assert_eq!(cache.keys(), vec!["ollama_cloud", "openai:gpt-4o"]);
    }

    #[tokio::test]
    async fn remove_reports_presence() {
        let cache: ClientCache<String> = ClientCache::new(DependencyKind::Audio);
        cache.put("whisper", Arc::new("w".into()));
        assert!(cache.remove("whisper").await);
        assert!(!cache.remove("whisper").await);
        assert!(cache.is_empty());
    }

    #[test]
    fn dependency_caches_lookup_by_kind() {
        let provider: Arc<dyn DependencyCache> =
            Arc::new(ClientCache::<String>::new(DependencyKind::Provider));
        let datasource: Arc<dyn DependencyCache> =
            Arc::new(ClientCache::<String>::new(DependencyKind::Datasource));
        let caches = DependencyCaches::new()
            .with(DependencyKind::Provider, provider)
            .with(DependencyKind::Datasource, datasource);
        assert!(caches.get(DependencyKind::Provider).is_some());
        assert!(caches.get(DependencyKind::Datasource).is_some());
        assert!(caches.get(DependencyKind::Audio).is_none());
        assert_eq!(
            format!("{caches:?}"),
            "DependencyCaches { wired: [Provider, Datasource] }"
        );
    }
}
