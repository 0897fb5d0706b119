// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Startup: registry load and parallel adapter preload.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use orbit_config::{OrbitConfig, ReloadConfig};
use orbit_core::{AdapterCache, AdapterLoader};
use serde::Serialize;
use tracing::{info, warn};

use crate::cache::DependencyCaches;
use crate::cache_cleaner::DependencyCacheCleaner;
use crate::config_manager::{AdapterConfigManager, LoadStats};
use crate::reloader::AdapterReloader;

/// Bounds for startup preload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadOptions {
    /// Per-adapter construction timeout.
    pub timeout: Duration,
    /// Adapters constructed at the same time.
    pub max_concurrency: usize,
}

impl Default for PreloadOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            max_concurrency: 8,
        }
    }
}

impl PreloadOptions {
    pub fn from_config(reload: &ReloadConfig) -> Self {
        Self {
            timeout: reload.preload_timeout(),
            max_concurrency: reload.preload_concurrency,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreloadOutcome {
    pub name: String,
    pub success: bool,
    pub message: String,
}

/// Per-adapter preload outcomes, sorted by adapter name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PreloadReport {
    pub outcomes: Vec<PreloadOutcome>,
}

impl PreloadReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &PreloadOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }
}

/// Construct every registered adapter concurrently and cache the successes.
///
/// Failures and timeouts are recorded in the report; they never abort
/// startup. Adapters that failed are built lazily on first use.
pub async fn preload_all(
    manager: &AdapterConfigManager,
    loader: &dyn AdapterLoader,
    cache: &dyn AdapterCache,
    options: PreloadOptions,
) -> PreloadReport {
    let registry = manager.snapshot();
    if registry.is_empty() {
        info!("no adapters to preload");
        return PreloadReport::default();
    }

    info!(
        adapters = registry.len(),
        concurrency = options.max_concurrency,
        timeout_secs = options.timeout.as_secs(),
        "preloading adapters"
    );

    let mut outcomes: Vec<PreloadOutcome> = stream::iter(registry.iter())
        .map(|(name, config)| async move {
            let started = Instant::now();
            match tokio::time::timeout(options.timeout, loader.load_adapter(name, config)).await {
                Ok(Ok(instance)) => {
                    cache.put(name, instance);
                    let elapsed = started.elapsed();
                    info!(adapter = %name, elapsed_ms = elapsed.as_millis() as u64, "preloaded adapter");
                    PreloadOutcome {
                        name: name.clone(),
                        success: true,
                        message: format!("loaded in {:.2}s", elapsed.as_secs_f64()),
                    }
                }
                Ok(Err(e)) => {
                    warn!(adapter = %name, error = %e, "adapter preload failed, will be built on first use");
                    PreloadOutcome {
                        name: name.clone(),
                        success: false,
                        message: e.to_string(),
                    }
                }
                Err(_) => {
                    warn!(
                        adapter = %name,
                        timeout_secs = options.timeout.as_secs(),
                        "adapter preload timed out, will be built on first use"
                    );
                    PreloadOutcome {
                        name: name.clone(),
                        success: false,
                        message: format!("timed out after {}s", options.timeout.as_secs()),
                    }
                }
            }
        })
        .buffer_unordered(options.max_concurrency.max(1))
        .collect()
        .await;

    outcomes.sort_by(|a, b| a.name.cmp(&b.name));
    let report = PreloadReport { outcomes };

    info!(
        "adapter preload complete: {}/{} successful",
        report.succeeded(),
        report.total()
    );

    report
}

/// Everything produced by [`bootstrap`].
pub struct Bootstrapped {
    pub reloader: AdapterReloader,
    pub load_stats: LoadStats,
    pub preload: PreloadReport,
}

/// Load the registry from `config`, preload every enabled adapter, and return
/// a reloader wired to the given collaborators.
pub async fn bootstrap(
    config: &OrbitConfig,
    loader: Arc<dyn AdapterLoader>,
    cache: Arc<dyn AdapterCache>,
    caches: DependencyCaches,
) -> Bootstrapped {
    let manager = Arc::new(AdapterConfigManager::new().with_verbose(config.general.verbose));
    let load_stats = manager.load(&config.adapters);

    let preload = preload_all(
        &manager,
        loader.as_ref(),
        cache.as_ref(),
        PreloadOptions::from_config(&config.reload),
    )
    .await;

    let cleaner = DependencyCacheCleaner::new(caches).with_defaults(config);
    let reloader = AdapterReloader::new(manager, cache, loader, cleaner)
        .with_rebuild_timeout(config.reload.rebuild_timeout());

    Bootstrapped {
        reloader,
        load_stats,
        preload,
    }
}
