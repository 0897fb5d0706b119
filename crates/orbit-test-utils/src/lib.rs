// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Orbit integration tests.
//!
//! Provides mock collaborators and a harness for fast, deterministic reload
//! tests without real provider clients.
//!
//! # Components
//!
//! - [`MockAdapter`] - Adapter instance that records shutdowns
//! - [`MockAdapterLoader`] - Loader with scripted failures and call counts
//! - [`RecordingDependencyCache`] - Dependent cache that counts every call
//! - [`ReloadHarness`] - Reloader wired to the mocks above

pub mod harness;
pub mod mock_adapter;
pub mod recording_cache;

pub use harness::{ReloadHarness, ReloadHarnessBuilder};
pub use mock_adapter::{LoadBehavior, MockAdapter, MockAdapterLoader};
pub use recording_cache::RecordingDependencyCache;
