// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the reload subsystem.
//!
//! All traits are object safe and use `#[async_trait]` so implementations can
//! be shared as `Arc<dyn Trait>` between the reloader and the serving layer.

pub mod adapter;
pub mod cache;
pub mod dependency;
pub mod loader;

pub use adapter::AdapterInstance;
pub use cache::AdapterCache;
pub use dependency::DependencyCache;
pub use loader::AdapterLoader;
