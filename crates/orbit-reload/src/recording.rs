// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers for the reload subsystem.
//!
//! Uses the metrics-rs facade; without an installed recorder these calls are
//! no-ops.

use metrics::{describe_counter, describe_gauge};
use orbit_core::{DependencyKind, ReloadAction};

/// Register metric descriptions. Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!("orbit_reloads_total", "Adapter reloads by resulting action");
    describe_counter!(
        "orbit_rebuild_failures_total",
        "Adapter rebuilds that failed and were deferred to lazy construction"
    );
    describe_counter!(
        "orbit_cache_invalidations_total",
        "Dependent cache entries removed during reloads"
    );
    describe_gauge!("orbit_registered_adapters", "Adapters currently registered");
}

pub fn record_reload(action: ReloadAction) {
    metrics::counter!("orbit_reloads_total", "action" => action.to_string()).increment(1);
}

pub fn record_rebuild_failure() {
    metrics::counter!("orbit_rebuild_failures_total").increment(1);
}

pub fn record_invalidation(kind: DependencyKind) {
    metrics::counter!("orbit_cache_invalidations_total", "kind" => kind.to_string()).increment(1);
}

pub fn set_registered_adapters(count: usize) {
    metrics::gauge!("orbit_registered_adapters").set(count as f64);
}
