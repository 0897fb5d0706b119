// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Descriptor-based adapter loader.
//!
//! Resolves an adapter's dependencies into the shared [`ClientCache`]s and
//! returns an [`AdapterHandle`] describing what the adapter was built from.
//! Network clients are plugged in by the serving layer; the handles recorded
//! here are what it keys them on.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orbit_config::OrbitConfig;
use orbit_core::{
    AdapterConfig, AdapterInstance, AdapterLoader, DependencyCache, DependencyKind, HealthStatus,
    OrbitError,
};
use tracing::debug;
use uuid::Uuid;

use crate::cache::{ClientCache, DependencyCaches};
use crate::cache_cleaner::{GlobalDefaults, resolve_dependencies};

/// A shared client record for one (kind, provider, model).
///
/// For stores `provider` is the store name; for datasources it is the
/// datasource and `model` the database override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHandle {
    pub kind: DependencyKind,
    pub provider: String,
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A constructed adapter: its configuration plus the shared clients it uses.
#[derive(Debug)]
pub struct AdapterHandle {
    name: String,
    config: AdapterConfig,
    instance_id: Uuid,
    loaded_at: DateTime<Utc>,
    clients: Vec<Arc<ClientHandle>>,
    closed: AtomicBool,
}

impl AdapterHandle {
    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn clients(&self) -> &[Arc<ClientHandle>] {
        &self.clients
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl AdapterInstance for AdapterHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    async fn health_check(&self) -> Result<HealthStatus, OrbitError> {
        if self.is_closed() {
            Ok(HealthStatus::Unhealthy("adapter has been shut down".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), OrbitError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

/// [`AdapterLoader`] that populates the shared client caches.
pub struct DescriptorLoader {
    provider: Arc<ClientCache<ClientHandle>>,
    embedding: Arc<ClientCache<ClientHandle>>,
    reranker: Arc<ClientCache<ClientHandle>>,
    vision: Arc<ClientCache<ClientHandle>>,
    audio: Arc<ClientCache<ClientHandle>>,
    store: Arc<ClientCache<ClientHandle>>,
    datasource: Arc<ClientCache<ClientHandle>>,
    defaults: ArcSwap<GlobalDefaults>,
}

impl DescriptorLoader {
    pub fn new() -> Self {
        Self {
            provider: Arc::new(ClientCache::new(DependencyKind::Provider)),
            embedding: Arc::new(ClientCache::new(DependencyKind::Embedding)),
            reranker: Arc::new(ClientCache::new(DependencyKind::Reranker)),
            vision: Arc::new(ClientCache::new(DependencyKind::Vision)),
            audio: Arc::new(ClientCache::new(DependencyKind::Audio)),
            store: Arc::new(ClientCache::new(DependencyKind::Store)),
            datasource: Arc::new(ClientCache::new(DependencyKind::Datasource)),
            defaults: ArcSwap::from_pointee(GlobalDefaults::default()),
        }
    }

    pub fn from_config(config: &OrbitConfig) -> Self {
        let loader = Self::new();
        loader.update_defaults(config);
        loader
    }

    /// Refresh the provider and model defaults used for clients built from now on.
    ///
    /// Entries already cached keep their keys; the cleaner holds its own
    /// snapshot of the previous defaults to find them.
    pub fn update_defaults(&self, config: &OrbitConfig) {
        self.defaults
            .store(Arc::new(GlobalDefaults::from_config(config)));
    }

    pub fn client_cache(&self, kind: DependencyKind) -> &Arc<ClientCache<ClientHandle>> {
        match kind {
            DependencyKind::Provider => &self.provider,
            DependencyKind::Embedding => &self.embedding,
            DependencyKind::Reranker => &self.reranker,
            DependencyKind::Vision => &self.vision,
            DependencyKind::Audio => &self.audio,
            DependencyKind::Store => &self.store,
            DependencyKind::Datasource => &self.datasource,
        }
    }

    /// Every client cache, wired for the dependency cleaner.
    pub fn dependency_caches(&self) -> DependencyCaches {
        DependencyCaches::new()
            .with(DependencyKind::Provider, self.provider.clone())
            .with(DependencyKind::Embedding, self.embedding.clone())
            .with(DependencyKind::Reranker, self.reranker.clone())
            .with(DependencyKind::Vision, self.vision.clone())
            .with(DependencyKind::Audio, self.audio.clone())
            .with(DependencyKind::Store, self.store.clone())
            .with(DependencyKind::Datasource, self.datasource.clone())
    }
}

impl Default for DescriptorLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdapterLoader for DescriptorLoader {
    async fn load_adapter(
        &self,
        name: &str,
        config: &AdapterConfig,
    ) -> Result<Arc<dyn AdapterInstance>, OrbitError> {
        if !config.enabled {
            return Err(OrbitError::Config(format!(
                "adapter '{name}' is disabled"
            )));
        }

        let defaults = self.defaults.load_full();
        let deps = resolve_dependencies(config, &defaults);
        if !deps.iter().any(|d| d.kind == DependencyKind::Provider) {
            return Err(OrbitError::Config(format!(
                "adapter '{name}' has no inference provider and no default is configured"
            )));
        }

        let clients = deps
            .iter()
            .map(|dep| {
                let cache = self.client_cache(dep.kind);
                let key = cache.build_cache_key(dep.provider, dep.model);
                cache.get_or_insert_with(&key, || {
                    debug!(adapter = name, kind = %dep.kind, key = %key, "created shared client");
                    ClientHandle {
                        kind: dep.kind,
                        provider: dep.provider.to_string(),
                        model: dep.model.map(str::to_string),
                        created_at: Utc::now(),
                    }
                })
            })
            .collect();

        Ok(Arc::new(AdapterHandle {
            name: name.to_string(),
            config: config.clone(),
            instance_id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            clients,
            closed: AtomicBool::new(false),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_populates_shared_caches() {
        let loader = DescriptorLoader::new();
        let qa = AdapterConfig::named("qa-sql")
            .with_inference("ollama", Some("llama3"))
            .with_embedding("ollama");
        let faq = AdapterConfig::named("faq").with_inference("ollama", Some("llama3"));

        let first = loader.load_adapter("qa-sql", &qa).await.unwrap();
        loader.load_adapter("faq", &faq).await.unwrap();

        assert_eq!(first.name(), "qa-sql");
        assert_eq!(first.config(), &qa);
        assert_eq!(
            loader.client_cache(DependencyKind::Provider).keys(),
            vec!["ollama:llama3"]
        );
        assert_eq!(
            loader.client_cache(DependencyKind::Embedding).keys(),
            vec!["ollama"]
        );
    }

    #[tokio::test]
    async fn missing_inference_provider_is_a_config_error() {
        let loader = DescriptorLoader::new();
        let err = loader
            .load_adapter("bare", &AdapterConfig::named("bare"))
            .await
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[tokio::test]
    async fn global_defaults_and_default_models_apply() {
        let toml = r#"
            [general]
            inference_provider = "openai"

            [embedding]
            provider = "openai"

            [embeddings.openai]
            model = "text-embedding-3-small"
        "#;
        let config: OrbitConfig = orbit_config::load_config_from_str(toml).unwrap();
        let loader = DescriptorLoader::from_config(&config);

        loader
            .load_adapter("bare", &AdapterConfig::named("bare"))
            .await
            .unwrap();

        assert_eq!(loader.client_cache(DependencyKind::Provider).keys(), vec!["openai"]);
        assert_eq!(
            loader.client_cache(DependencyKind::Embedding).keys(),
            vec!["openai:text-embedding-3-small"]
        );
    }

    #[tokio::test]
    async fn store_and_datasource_are_shared_clients() {
        let loader = DescriptorLoader::new();
        let mut cfg = AdapterConfig::named("intent")
            .with_inference("ollama", None)
            .with_datasource("sqlite")
            .with_option("store_name", serde_json::json!("faq-intents"));
        cfg.extra
            .insert("database".into(), serde_json::json!("orders.db"));

        loader.load_adapter("intent", &cfg).await.unwrap();

        assert_eq!(
            loader.client_cache(DependencyKind::Store).keys(),
            vec!["faq-intents"]
        );
        assert_eq!(
            loader.client_cache(DependencyKind::Datasource).keys(),
            vec!["sqlite:orders.db"]
        );
    }

    #[tokio::test]
    async fn shutdown_marks_handle_unhealthy() {
        let loader = DescriptorLoader::new();
        let cfg = AdapterConfig::named("qa").with_inference("ollama", None);
        let handle = loader.load_adapter("qa", &cfg).await.unwrap();

        assert_eq!(handle.health_check().await.unwrap(), HealthStatus::Healthy);
        handle.shutdown().await.unwrap();
        assert!(matches!(
            handle.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}
