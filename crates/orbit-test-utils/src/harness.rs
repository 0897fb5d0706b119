// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for reload integration tests.
//!
//! `ReloadHarness` bootstraps a reloader against [`MockAdapterLoader`], an
//! [`InMemoryAdapterCache`] and one [`RecordingDependencyCache`] per kind.

use std::sync::Arc;
use std::time::Duration;

use orbit_config::OrbitConfig;
use orbit_core::{AdapterConfig, DependencyKind};
use orbit_reload::{
    AdapterReloader, DependencyCaches, InMemoryAdapterCache, LoadStats, PreloadReport, bootstrap,
};

use crate::mock_adapter::{LoadBehavior, MockAdapterLoader};
use crate::recording_cache::RecordingDependencyCache;

/// Builder for [`ReloadHarness`].
pub struct ReloadHarnessBuilder {
    config: OrbitConfig,
    behaviors: Vec<(String, LoadBehavior)>,
}

impl ReloadHarnessBuilder {
    fn new() -> Self {
        Self {
            config: OrbitConfig::default(),
            behaviors: Vec::new(),
        }
    }

    /// Start from a full configuration.
    pub fn with_config(mut self, config: OrbitConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_adapters(mut self, adapters: Vec<AdapterConfig>) -> Self {
        self.config.adapters = adapters;
        self
    }

    /// Script the loader before bootstrap runs, so preload sees it too.
    pub fn with_behavior(mut self, name: &str, behavior: LoadBehavior) -> Self {
        self.behaviors.push((name.to_string(), behavior));
        self
    }

    pub fn with_preload_timeout(mut self, timeout: Duration) -> Self {
        self.config.reload.preload_timeout_secs = timeout.as_secs();
        self
    }

    pub async fn build(self) -> ReloadHarness {
        let loader = Arc::new(MockAdapterLoader::new());
        for (name, behavior) in self.behaviors {
            loader.set_behavior(&name, behavior);
        }

        let provider = Arc::new(RecordingDependencyCache::with_prefix_removal());
        let embedding = Arc::new(RecordingDependencyCache::new());
        let reranker = Arc::new(RecordingDependencyCache::new());
        let vision = Arc::new(RecordingDependencyCache::new());
        let audio = Arc::new(RecordingDependencyCache::new());
        let store = Arc::new(RecordingDependencyCache::new());
        let datasource = Arc::new(RecordingDependencyCache::new());
        let caches = DependencyCaches::new()
            .with(DependencyKind::Provider, provider.clone())
            .with(DependencyKind::Embedding, embedding.clone())
            .with(DependencyKind::Reranker, reranker.clone())
            .with(DependencyKind::Vision, vision.clone())
            .with(DependencyKind::Audio, audio.clone())
            .with(DependencyKind::Store, store.clone())
            .with(DependencyKind::Datasource, datasource.clone());

        let cache = Arc::new(InMemoryAdapterCache::new());
        let boot = bootstrap(&self.config, loader.clone(), cache.clone(), caches).await;

        ReloadHarness {
            reloader: boot.reloader,
            load_stats: boot.load_stats,
            preload: boot.preload,
            loader,
            cache,
            provider,
            embedding,
            reranker,
            vision,
            audio,
            store,
            datasource,
        }
    }
}

/// A bootstrapped reloader plus handles to every mock it talks to.
pub struct ReloadHarness {
    pub reloader: AdapterReloader,
    pub load_stats: LoadStats,
    pub preload: PreloadReport,
    pub loader: Arc<MockAdapterLoader>,
    pub cache: Arc<InMemoryAdapterCache>,
    pub provider: Arc<RecordingDependencyCache>,
    pub embedding: Arc<RecordingDependencyCache>,
    pub reranker: Arc<RecordingDependencyCache>,
    pub vision: Arc<RecordingDependencyCache>,
    pub audio: Arc<RecordingDependencyCache>,
    pub store: Arc<RecordingDependencyCache>,
    pub datasource: Arc<RecordingDependencyCache>,
}

impl ReloadHarness {
    pub fn builder() -> ReloadHarnessBuilder {
        ReloadHarnessBuilder::new()
    }

    /// Bootstrap with `adapters` and default settings.
    pub async fn with_adapters(adapters: Vec<AdapterConfig>) -> Self {
        Self::builder().with_adapters(adapters).build().await
    }

    pub fn dependency_cache(&self, kind: DependencyKind) -> &Arc<RecordingDependencyCache> {
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

    /// Mutating calls made against all dependent caches.
    pub fn dependency_mutations(&self) -> usize {
        [
            &self.provider,
            &self.embedding,
            &self.reranker,
            &self.vision,
            &self.audio,
            &self.store,
            &self.datasource,
        ]
        .iter()
        .map(|c| c.mutation_calls())
        .sum()
    }
}
