// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter configuration reconciliation and hot reload.
//!
//! Lets operators add, update, remove, enable, or disable adapters in a
//! running gateway while keeping the shared per-provider client caches
//! consistent with the authoritative configuration.
//!
//! - [`change_detector`] compares adapter definitions.
//! - [`AdapterConfigManager`] is the registry of enabled definitions.
//! - [`DependencyCacheCleaner`] evicts stale shared clients.
//! - [`AdapterReloader`] runs the single-adapter and bulk reload protocols.
//! - [`bootstrap`] loads the registry and preloads adapters at startup.

pub mod cache;
pub mod cache_cleaner;
pub mod change_detector;
pub mod config_manager;
pub mod descriptor;
pub mod preload;
pub mod recording;
pub mod reloader;

pub use cache::{ClientCache, DependencyCaches, InMemoryAdapterCache};
pub use cache_cleaner::{DependencyCacheCleaner, GlobalDefaults};
pub use change_detector::{AffectedDependencies, affected_dependent_kinds, detect_changes, differs};
pub use config_manager::{AdapterConfigManager, ChangeSet, LoadStats};
pub use descriptor::{AdapterHandle, ClientHandle, DescriptorLoader};
pub use preload::{
    Bootstrapped, PreloadOptions, PreloadOutcome, PreloadReport, bootstrap, preload_all,
};
pub use reloader::{AdapterReloader, BulkReloadSummary, ReloadResult};
