// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered config loading with Figment.
//!
//! Lookup order: `./reclaim.toml` > `~/.config/reclaim/reclaim.toml` >
//! `/etc/reclaim/reclaim.toml`, with `RECLAIM_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ReclaimConfig;

/// Env sections recognised after the `RECLAIM_` prefix.
const SECTIONS: &[&str] = &["service", "recovery", "scheduler", "storage", "smtp"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/reclaim/reclaim.toml`
/// 3. `~/.config/reclaim/reclaim.toml`
/// 4. `./reclaim.toml`
/// 5. `RECLAIM_*` environment variables
pub fn load_config() -> Result<ReclaimConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no env.
pub fn load_config_from_str(toml_content: &str) -> Result<ReclaimConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReclaimConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
///
/// Unlike the XDG layers, the file must exist: a missing path is an error,
/// not an empty layer.
pub fn load_config_from_path(path: &Path) -> Result<ReclaimConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ReclaimConfig::default()))
        .merge(Toml::file_exact(path))
        .merge(env_provider())
        .extract()
}

/// The Figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ReclaimConfig::default()))
        .merge(Toml::file("/etc/reclaim/reclaim.toml"))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file("reclaim.toml"))
        .merge(env_provider())
}

fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("reclaim/reclaim.toml"))
        .unwrap_or_default()
}

/// Map `RECLAIM_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `RECLAIM_RECOVERY_WAIT_MINUTES` lands on `recovery.wait_minutes`.
fn env_provider() -> Env {
    Env::prefixed("RECLAIM_").map(|key| map_env_key(key.as_str()).into())
}

pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
