// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file watcher driving bulk reloads.
//!
//! The parent directory is watched so that editors which replace the file
//! (write to a temp file, then rename) are still picked up.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use orbit_core::OrbitError;
use orbit_reload::{AdapterReloader, BulkReloadSummary, DescriptorLoader};
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Keeps the file watcher alive; dropping it stops watching.
pub struct ConfigWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
}

impl ConfigWatcher {
    /// Watch `path` and run a bulk reload after each debounced change.
    pub fn spawn(
        path: PathBuf,
        debounce: Duration,
        reloader: Arc<Mutex<AdapterReloader>>,
        loader: Arc<DescriptorLoader>,
        cancel: CancellationToken,
    ) -> Result<Self, OrbitError> {
        let target = path.canonicalize().unwrap_or(path);
        let file_name = target.file_name().map(|n| n.to_os_string());
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| OrbitError::Config(format!("cannot watch `{}`", target.display())))?;

        let (tx, mut rx) = mpsc::channel::<()>(1);
        let mut debouncer = new_debouncer(debounce, move |res: DebounceEventResult| match res {
            Ok(events) => {
                if events
                    .iter()
                    .any(|event| event.path.file_name() == file_name.as_deref())
                {
                    // A pending reload already covers this change.
                    let _ = tx.try_send(());
                }
            }
            Err(e) => warn!(error = ?e, "configuration watch error"),
        })
        .map_err(|e| OrbitError::Internal(format!("failed to create config watcher: {e}")))?;

        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| OrbitError::Internal(format!("failed to watch `{}`: {e}", dir.display())))?;

        info!(path = %target.display(), "watching configuration file");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    Some(()) = rx.recv() => {
                        reload_from_file(&target, &reloader, &loader).await;
                    }
                    _ = cancel.cancelled() => break,
                }
            }
        });

        Ok(Self {
            _debouncer: debouncer,
        })
    }
}

/// Reload the configuration at `path` and reconcile every adapter against it.
///
/// An invalid configuration is rendered and ignored; the running adapters
/// are kept as they are.
pub async fn reload_from_file(
    path: &Path,
    reloader: &Mutex<AdapterReloader>,
    loader: &DescriptorLoader,
) -> Option<BulkReloadSummary> {
    info!(path = %path.display(), "configuration change detected, reloading");

    let config = match orbit_config::load_and_validate_path(path) {
        Ok(config) => config,
        Err(errors) => {
            error!(
                errors = errors.len(),
                "configuration reload rejected, keeping current adapters"
            );
            orbit_config::render_errors(&errors);
            return None;
        }
    };

    let reloader = reloader.lock().await;
    // Rebuilds use the new defaults; the cleaner swaps its own snapshot last.
    loader.update_defaults(&config);
    Some(reloader.reload_all_adapters(&config).await)
}
