// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock adapter instance and loader for deterministic reload tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use orbit_core::{AdapterConfig, AdapterInstance, AdapterLoader, HealthStatus, OrbitError};
use tracing::debug;

/// An adapter instance that only remembers how it was built.
#[derive(Debug)]
pub struct MockAdapter {
    name: String,
    config: AdapterConfig,
    shutdowns: AtomicUsize,
}

impl MockAdapter {
    pub fn new(name: &str, config: AdapterConfig) -> Self {
        Self {
            name: name.to_string(),
            config,
            shutdowns: AtomicUsize::new(0),
        }
    }

    /// Number of times `shutdown` was called.
    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdapterInstance for MockAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    async fn health_check(&self) -> Result<HealthStatus, OrbitError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), OrbitError> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Scripted behavior for one adapter name.
#[derive(Debug, Clone)]
pub enum LoadBehavior {
    Succeed,
    /// Fail with [`OrbitError::Config`].
    ConfigError(String),
    /// Fail with a transient provider error.
    ProviderError(String),
    /// Sleep before succeeding.
    Delay(Duration),
}

/// Loader returning [`MockAdapter`]s, with per-name scripted failures.
#[derive(Default)]
pub struct MockAdapterLoader {
    behaviors: DashMap<String, LoadBehavior>,
    calls: DashMap<String, usize>,
    total: AtomicUsize,
}

impl MockAdapterLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the behavior for `name`. Unscripted names succeed.
    pub fn set_behavior(&self, name: &str, behavior: LoadBehavior) {
        self.behaviors.insert(name.to_string(), behavior);
    }

    pub fn fail_with_config_error(&self, name: &str) {
        self.set_behavior(
            name,
            LoadBehavior::ConfigError(format!("adapter '{name}' is misconfigured")),
        );
    }

    pub fn fail_transiently(&self, name: &str) {
        self.set_behavior(
            name,
            LoadBehavior::ProviderError(format!("provider for '{name}' is unreachable")),
        );
    }

    /// Number of load attempts for `name`.
    pub fn load_count(&self, name: &str) -> usize {
        self.calls.get(name).map(|c| *c).unwrap_or(0)
    }

    /// Number of load attempts across all names.
    pub fn total_loads(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdapterLoader for MockAdapterLoader {
    async fn load_adapter(
        &self,
        name: &str,
        config: &AdapterConfig,
    ) -> Result<Arc<dyn AdapterInstance>, OrbitError> {
        *self.calls.entry(name.to_string()).or_insert(0) += 1;
        self.total.fetch_add(1, Ordering::SeqCst);

        let behavior = self
            .behaviors
            .get(name)
            .map(|b| b.value().clone())
            .unwrap_or(LoadBehavior::Succeed);

        debug!(adapter = name, behavior = ?behavior, "mock adapter load");
        match behavior {
            LoadBehavior::Succeed => {}
            LoadBehavior::ConfigError(message) => return Err(OrbitError::Config(message)),
            LoadBehavior::ProviderError(message) => return Err(OrbitError::provider(message)),
            LoadBehavior::Delay(duration) => tokio::time::sleep(duration).await,
        }

        Ok(Arc::new(MockAdapter::new(name, config.clone())))
    }
}
