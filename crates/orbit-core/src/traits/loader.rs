// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter construction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::OrbitError;
use crate::traits::adapter::AdapterInstance;
use crate::types::AdapterConfig;

/// Builds adapter instances from their configuration.
#[async_trait]
pub trait AdapterLoader: Send + Sync {
    /// Construct the adapter `name` from `config`.
    ///
    /// Return [`OrbitError::Config`] for failures the operator must fix. Any
    /// other error is treated as transient and the adapter is left to be
    /// built lazily on next access.
    async fn load_adapter(
        &self,
        name: &str,
        config: &AdapterConfig,
    ) -> Result<Arc<dyn AdapterInstance>, OrbitError>;
}
