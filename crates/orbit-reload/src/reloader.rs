// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-adapter and bulk reload protocols.
//!
//! Within one call the order is always invalidate, evict, then rebuild.
//! Reload calls are not guarded against each other: the owner must serialize
//! them (the binary keeps the reloader behind a `tokio::sync::Mutex`).

use std::sync::Arc;
use std::time::Duration;

use orbit_config::OrbitConfig;
use orbit_core::{AdapterCache, AdapterConfig, AdapterLoader, OrbitError, ReloadAction};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::cache_cleaner::DependencyCacheCleaner;
use crate::change_detector::detect_changes;
use crate::config_manager::AdapterConfigManager;
use crate::recording;

/// Outcome of [`AdapterReloader::reload_single_adapter`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReloadResult {
    pub adapter_name: String,
    pub action: ReloadAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_config: Option<AdapterConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_config: Option<AdapterConfig>,
}

/// Outcome of [`AdapterReloader::reload_all_adapters`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReloadSummary {
    pub added: usize,
    pub removed: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Registered adapters after the reload.
    pub total: usize,
    pub added_names: Vec<String>,
    pub removed_names: Vec<String>,
    pub updated_names: Vec<String>,
}

/// Applies configuration changes to the registry, the dependent caches and
/// the adapter cache.
pub struct AdapterReloader {
    manager: Arc<AdapterConfigManager>,
    cache: Arc<dyn AdapterCache>,
    loader: Arc<dyn AdapterLoader>,
    cleaner: DependencyCacheCleaner,
    rebuild_timeout: Option<Duration>,
}

impl AdapterReloader {
    pub fn new(
        manager: Arc<AdapterConfigManager>,
        cache: Arc<dyn AdapterCache>,
        loader: Arc<dyn AdapterLoader>,
        cleaner: DependencyCacheCleaner,
    ) -> Self {
        Self {
            manager,
            cache,
            loader,
            cleaner,
            rebuild_timeout: None,
        }
    }

    /// Bound every rebuild by `timeout`. A timed-out rebuild counts as a
    /// transient failure.
    pub fn with_rebuild_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.rebuild_timeout = timeout;
        self
    }

    pub fn manager(&self) -> &Arc<AdapterConfigManager> {
        &self.manager
    }

    pub fn cache(&self) -> &Arc<dyn AdapterCache> {
        &self.cache
    }

    pub fn cleaner(&self) -> &DependencyCacheCleaner {
        &self.cleaner
    }

    /// Reload one adapter from `full_config`.
    ///
    /// Fails only when `name` is not defined in `full_config`, in which case
    /// nothing is mutated. Rebuild failures are logged and the adapter is
    /// left to be built lazily; the call still succeeds.
    pub async fn reload_single_adapter(
        &self,
        name: &str,
        full_config: &OrbitConfig,
    ) -> Result<ReloadResult, OrbitError> {
        let new_config = full_config
            .find_adapter(name)
            .cloned()
            .ok_or_else(|| OrbitError::AdapterNotFound {
                name: name.to_string(),
            })?;

        let tracked = self.manager.get(name);
        let was_tracked = tracked.is_some();
        let mut recovered = false;
        let previous = match tracked {
            Some(cfg) => Some(cfg),
            None => self.cache.get(name).map(|instance| {
                recovered = true;
                instance.config().clone()
            }),
        };

        if let Some(old) = &previous {
            let changes = detect_changes(old, &new_config);
            if !changes.is_empty() {
                debug!(adapter = name, changes = ?changes, "adapter config changes");
            }
        }

        self.cleaner
            .clear_adapter_dependencies(name, previous.as_ref().or(Some(&new_config)))
            .await;

        if self.cache.remove(name).await.is_some() {
            debug!(adapter = name, "evicted cached adapter instance");
        }

        if !new_config.enabled {
            self.manager.remove(name);
            self.manager.mark_disabled(name);
            recording::record_reload(ReloadAction::Disabled);
            info!(adapter = name, action = %ReloadAction::Disabled, "adapter reloaded");
            return Ok(ReloadResult {
                adapter_name: name.to_string(),
                action: ReloadAction::Disabled,
                previous_config: previous,
                new_config: None,
            });
        }

        let action = if was_tracked {
            ReloadAction::Updated
        } else if recovered || self.manager.was_disabled(name) {
            ReloadAction::Enabled
        } else {
            ReloadAction::Added
        };

        self.manager.put(name, new_config.clone());
        self.rebuild(name, &new_config).await;

        recording::record_reload(action);
        info!(adapter = name, action = %action, "adapter reloaded");

        Ok(ReloadResult {
            adapter_name: name.to_string(),
            action,
            previous_config: previous,
            new_config: Some(new_config),
        })
    }

    /// Reconcile every adapter against `full_config`.
    ///
    /// Additions and updates are processed before removals. Unchanged
    /// adapters are not touched. Not atomic across adapters.
    pub async fn reload_all_adapters(&self, full_config: &OrbitConfig) -> BulkReloadSummary {
        let before = self.manager.snapshot();
        let changes = self.manager.reconcile(&full_config.adapters);
        let after = self.manager.snapshot();

        for name in &changes.added {
            let Some(cfg) = after.get(name) else {
                continue;
            };
            if self.cache.contains(name) {
                self.cache.remove(name).await;
            }
            self.rebuild(name, cfg).await;
            recording::record_reload(ReloadAction::Added);
        }

        for name in &changes.updated {
            let Some(cfg) = after.get(name) else {
                continue;
            };
            self.cleaner
                .clear_adapter_dependencies(name, before.get(name))
                .await;
            self.cache.remove(name).await;
            self.rebuild(name, cfg).await;
            recording::record_reload(ReloadAction::Updated);
        }

        for name in &changes.removed {
            self.cleaner
                .clear_adapter_dependencies(name, before.get(name))
                .await;
            if self.cache.remove(name).await.is_some() {
                debug!(adapter = %name, "evicted removed adapter instance");
            }
        }

        for _ in &changes.unchanged {
            recording::record_reload(ReloadAction::Unchanged);
        }

        self.cleaner.update_defaults(full_config);

        let summary = BulkReloadSummary {
            added: changes.added.len(),
            removed: changes.removed.len(),
            updated: changes.updated.len(),
            unchanged: changes.unchanged.len(),
            total: self.manager.len(),
            added_names: changes.added.into_iter().collect(),
            removed_names: changes.removed.into_iter().collect(),
            updated_names: changes.updated.into_iter().collect(),
        };

        info!(
            added = summary.added,
            removed = summary.removed,
            updated = summary.updated,
            unchanged = summary.unchanged,
            total = summary.total,
            "bulk adapter reload complete"
        );

        summary
    }

    /// Construct `name` and cache it. Failures are logged, never returned.
    async fn rebuild(&self, name: &str, config: &AdapterConfig) -> bool {
        let load = self.loader.load_adapter(name, config);
        let result = match self.rebuild_timeout {
            Some(duration) => match tokio::time::timeout(duration, load).await {
                Ok(result) => result,
                Err(_) => Err(OrbitError::Timeout { duration }),
            },
            None => load.await,
        };

        match result {
            Ok(instance) => {
                self.cache.put(name, instance);
                debug!(adapter = name, "rebuilt adapter instance");
                true
            }
            Err(e) => {
                recording::record_rebuild_failure();
                if e.is_configuration() {
                    error!(adapter = name, error = %e, "adapter rebuild failed, configuration must be fixed");
                } else {
                    warn!(adapter = name, error = %e, "adapter rebuild failed, will be built on next request");
                }
                false
            }
        }
    }
}
