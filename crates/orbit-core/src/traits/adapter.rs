// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait implemented by every live adapter instance.

use async_trait::async_trait;

use crate::error::OrbitError;
use crate::types::{AdapterConfig, HealthStatus};

/// A constructed adapter, ready to serve requests.
///
/// Instances keep the configuration they were built from. The reloader uses
/// it to recover a prior definition for adapters the registry no longer
/// tracks.
#[async_trait]
pub trait AdapterInstance: Send + Sync + 'static {
    /// Returns the adapter name this instance was built for.
    fn name(&self) -> &str;

    /// Returns the configuration this instance was built from.
    fn config(&self) -> &AdapterConfig;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, OrbitError>;

    /// Gracefully shuts down the adapter, releasing any held resources.
    async fn shutdown(&self) -> Result<(), OrbitError>;
}
