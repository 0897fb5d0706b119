// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache of constructed adapter instances, read on every request.

use std::sync::Arc;

use async_trait::async_trait;

use crate::traits::adapter::AdapterInstance;

/// Name-keyed cache of live adapter instances.
///
/// A miss means "not built right now", never "does not exist": readers are
/// expected to rebuild lazily or reject with a retryable error.
#[async_trait]
pub trait AdapterCache: Send + Sync {
    fn contains(&self, name: &str) -> bool;

    fn get(&self, name: &str) -> Option<Arc<dyn AdapterInstance>>;

    fn put(&self, name: &str, instance: Arc<dyn AdapterInstance>);

    /// Evicts the instance for `name`, releasing its resources. Returns the
    /// evicted instance, if any.
    async fn remove(&self, name: &str) -> Option<Arc<dyn AdapterInstance>>;
}
