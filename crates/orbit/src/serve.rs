// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `orbit serve` command implementation.
//!
//! Bootstraps the adapter registry, preloads every enabled adapter, and keeps
//! the reloader behind a mutex so file-triggered reloads run one at a time.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use orbit_config::OrbitConfig;
use orbit_core::OrbitError;
use orbit_reload::{DescriptorLoader, InMemoryAdapterCache, bootstrap, recording};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::watch::ConfigWatcher;

/// Runs the `orbit serve` command until Ctrl-C or SIGTERM.
pub async fn run_serve(config: OrbitConfig, config_path: Option<PathBuf>) -> Result<(), OrbitError> {
    init_tracing(&config.general.log_level);

    info!("starting orbit serve");
    recording::register_metrics();

    let loader = Arc::new(DescriptorLoader::from_config(&config));
    let cache = Arc::new(InMemoryAdapterCache::new());
    let boot = bootstrap(&config, loader.clone(), cache.clone(), loader.dependency_caches()).await;

    for outcome in boot.preload.failed() {
        warn!(adapter = %outcome.name, reason = %outcome.message, "adapter not preloaded");
    }
    info!(
        adapters = boot.reloader.manager().len(),
        cached = cache.len(),
        "adapters ready"
    );

    let reloader = Arc::new(Mutex::new(boot.reloader));
    let cancel = install_signal_handler();

    let _watcher = match watch_target(&config, config_path.as_deref()) {
        Some(path) => Some(ConfigWatcher::spawn(
            path,
            config.reload.debounce(),
            reloader.clone(),
            loader.clone(),
            cancel.clone(),
        )?),
        None => None,
    };

    cancel.cancelled().await;

    info!("shutting down, releasing adapter instances");
    cache.clear().await;
    info!("orbit serve shutdown complete");
    Ok(())
}

/// The file to watch for changes, if hot reload applies.
fn watch_target(config: &OrbitConfig, explicit: Option<&Path>) -> Option<PathBuf> {
    if !config.reload.watch {
        info!("configuration watch disabled");
        return None;
    }
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let local = PathBuf::from("orbit.toml");
            if local.is_file() {
                Some(local)
            } else {
                warn!("no configuration file to watch, hot reload disabled");
                None
            }
        }
    }
}

/// Cancels the returned token on Ctrl-C (and SIGTERM on unix).
fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => info!("received SIGINT (Ctrl+C), initiating shutdown"),
                        _ = sigterm.recv() => info!("received SIGTERM, initiating shutdown"),
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received Ctrl+C, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("orbit={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
