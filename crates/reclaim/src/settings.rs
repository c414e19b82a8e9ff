// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recovery settings re-read from disk at every tick.

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use reclaim_config::{ConfigError, ReclaimConfig, RecoveryConfig};
use reclaim_core::ReclaimError;
use reclaim_engine::SettingsSource;
use tracing::{debug, info, warn};

/// Reloads the configuration each time the scheduler asks.
///
/// A reload that fails validation keeps the last good recovery section, so
/// a half-saved edit never stops the scheduler.
pub struct FileSettings {
    path: Option<PathBuf>,
    last_good: RwLock<RecoveryConfig>,
}

impl FileSettings {
    /// `path` is the explicit `--config` file; `None` uses the XDG hierarchy.
    pub fn new(path: Option<PathBuf>, initial: RecoveryConfig) -> Self {
        Self {
            path,
            last_good: RwLock::new(initial),
        }
    }

    fn last_good(&self) -> RecoveryConfig {
        self.last_good
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub fn load(path: Option<&std::path::Path>) -> Result<ReclaimConfig, Vec<ConfigError>> {
    match path {
        Some(path) => reclaim_config::load_and_validate_path(path),
        None => reclaim_config::load_and_validate(),
    }
}

#[async_trait]
impl SettingsSource for FileSettings {
    async fn recovery(&self) -> Result<RecoveryConfig, ReclaimError> {
        let path = self.path.clone();
        let loaded = tokio::task::spawn_blocking(move || load(path.as_deref()))
            .await
            .map_err(|e| ReclaimError::Internal(format!("config reload task failed: {e}")))?;

        match loaded {
            Ok(config) => {
                let mut last_good = self
                    .last_good
                    .write()
                    .unwrap_or_else(PoisonError::into_inner);
                if *last_good != config.recovery {
                    info!(enabled = config.recovery.enabled, "recovery settings changed");
                }
                *last_good = config.recovery.clone();
                Ok(config.recovery)
            }
            Err(errors) => {
                warn!(
                    errors = errors.len(),
                    "config reload failed; keeping previous recovery settings"
                );
                for error in &errors {
                    debug!(%error, "config reload error");
                }
                Ok(self.last_good())
            }
        }
    }
}
