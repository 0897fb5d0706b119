// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Orbit gateway.

use thiserror::Error;

/// The primary error type used across Orbit collaborator traits and reload operations.
#[derive(Debug, Error)]
pub enum OrbitError {
    /// Configuration errors (invalid adapter definition, missing required fields).
    ///
    /// Adapter loaders return this variant for failures the operator has to fix;
    /// every other variant is treated as transient during a reload.
    #[error("configuration error: {0}")]
    Config(String),

    /// The requested adapter is not part of the supplied configuration.
    #[error("adapter '{name}' not found in configuration")]
    AdapterNotFound { name: String },

    /// Provider errors (unreachable endpoint, rejected credentials, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Adapter configuration could not be serialized for comparison.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl OrbitError {
    /// Returns true for errors the caller must act on (as opposed to transient failures).
    pub fn is_configuration(&self) -> bool {
        matches!(self, OrbitError::Config(_) | OrbitError::AdapterNotFound { .. })
    }

    /// Convenience constructor for provider errors without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        OrbitError::Provider {
            message: message.into(),
            source: None,
        }
    }
}
