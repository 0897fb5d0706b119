// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Orbit gateway.
//!
//! This crate provides the error type, the adapter configuration model, and
//! the collaborator traits that the reload subsystem and the serving layer
//! share. Concrete caches and loaders implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::OrbitError;
pub use types::{AdapterConfig, DependencyKind, HealthStatus, ReloadAction};

pub use traits::{AdapterCache, AdapterInstance, AdapterLoader, DependencyCache};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_error_has_all_variants() {
        let _config = OrbitError::Config("test".into());
        let _not_found = OrbitError::AdapterNotFound {
            name: "test".into(),
        };
        let _provider = OrbitError::Provider {
            message: "test".into(),
            source: Some(Box::new(std::io::Error::other("test"))),
        };
        let _timeout = OrbitError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = OrbitError::Internal("test".into());
    }

    #[test]
    fn adapter_not_found_message() {
        let err = OrbitError::AdapterNotFound {
            name: "missing".into(),
        };
        assert_eq!(
            err.to_string(),
            "adapter 'missing' not found in configuration"
        );
    }

    #[test]
    fn configuration_errors_are_classified() {
        assert!(OrbitError::Config("bad".into()).is_configuration());
        assert!(
            OrbitError::AdapterNotFound {
                name: "x".into()
            }
            .is_configuration()
        );
        assert!(!OrbitError::provider("unreachable").is_configuration());
        assert!(
            !OrbitError::Timeout {
                duration: std::time::Duration::from_secs(1)
            }
            .is_configuration()
        );
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Fails to compile if any collaborator trait loses object safety.
        fn _assert_instance(_: &dyn AdapterInstance) {}
        fn _assert_cache(_: &dyn AdapterCache) {}
        fn _assert_loader(_: &dyn AdapterLoader) {}
        fn _assert_dependency(_: &dyn DependencyCache) {}
    }
}
