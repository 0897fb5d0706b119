// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./orbit.toml` > `~/.config/orbit/orbit.toml` > `/etc/orbit/orbit.toml`
//! with environment variable overrides via `ORBIT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::OrbitConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/orbit/orbit.toml` (system-wide)
/// 3. `~/.config/orbit/orbit.toml` (user XDG config)
/// 4. `./orbit.toml` (local directory)
/// 5. `ORBIT_*` environment variables
pub fn load_config() -> Result<OrbitConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<OrbitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OrbitConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
///
/// This is the path taken on every hot reload, so the file is re-read each call.
pub fn load_config_from_path(path: &Path) -> Result<OrbitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(OrbitConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(OrbitConfig::default()))
        .merge(Toml::file("/etc/orbit/orbit.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("orbit/orbit.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("orbit.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `ORBIT_RELOAD_PRELOAD_TIMEOUT_SECS` must map to
/// `reload.preload_timeout_secs`, not `reload.preload.timeout.secs`.
fn env_provider() -> Env {
    Env::prefixed("ORBIT_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("general_", "general.", 1)
            .replacen("embedding_", "embedding.", 1)
            .replacen("reranker_", "reranker.", 1)
            .replacen("vision_", "vision.", 1)
            .replacen("sound_", "sound.", 1)
            .replacen("stt_", "stt.", 1)
            .replacen("tts_", "tts.", 1)
            .replacen("reload_", "reload.", 1);
        mapped.into()
    })
}
