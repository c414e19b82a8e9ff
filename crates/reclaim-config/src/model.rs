// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Reclaim recovery engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Reclaim configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReclaimConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Reminder cadence and recovery link settings.
    #[serde(default)]
    pub recovery: RecoveryConfig,

    /// Periodic tick settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Cart store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outbound SMTP settings.
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Instance name, included in log output.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "reclaim".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Reminder cadence configuration.
///
/// Re-read at the start of every tick, so flipping `enabled` takes effect
/// without a restart.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecoveryConfig {
    /// Master switch. When false every tick is a no-op.
    #[serde(default = "default_recovery_enabled")]
    pub enabled: bool,

    /// Grace period after cart creation before the first reminder.
    #[serde(default = "default_wait_minutes")]
    pub wait_minutes: u32,

    /// Maximum number of reminders per cart.
    #[serde(default = "default_max_recovery_emails")]
    pub max_recovery_emails: u32,

    /// Minimum spacing between two reminders to the same cart.
    #[serde(default = "default_email_interval_hours")]
    pub email_interval_hours: u32,

    /// Lifetime of a recovery link.
    #[serde(default = "default_recovery_link_expiry_days")]
    pub recovery_link_expiry_days: u32,

    /// Template rendered for the reminder body.
    #[serde(default = "default_template_id")]
    pub template_id: String,

    /// Subject line; may contain `{{placeholders}}`.
    #[serde(default = "default_subject")]
    pub subject: String,

    /// Landing URL for recovery links; the token is appended as `?token=`.
    #[serde(default = "default_recovery_base_url")]
    pub recovery_base_url: String,

    /// Store name exposed to templates.
    #[serde(default = "default_shop_name")]
    pub shop_name: String,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: default_recovery_enabled(),
            wait_minutes: default_wait_minutes(),
            max_recovery_emails: default_max_recovery_emails(),
            email_interval_hours: default_email_interval_hours(),
            recovery_link_expiry_days: default_recovery_link_expiry_days(),
            template_id: default_template_id(),
            subject: default_subject(),
            recovery_base_url: default_recovery_base_url(),
            shop_name: default_shop_name(),
        }
    }
}

fn default_recovery_enabled() -> bool {
    true
}

fn default_wait_minutes() -> u32 {
    60
}

fn default_max_recovery_emails() -> u32 {
    3
}

fn default_email_interval_hours() -> u32 {
    24
}

fn default_recovery_link_expiry_days() -> u32 {
    7
}

fn default_template_id() -> String {
    "default".to_string()
}

fn default_subject() -> String {
    "You left something in your cart at {{shop_name}}".to_string()
}

fn default_recovery_base_url() -> String {
    "http://localhost:8080/cart/recover".to_string()
}

fn default_shop_name() -> String {
    "our store".to_string()
}

/// Periodic scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Seconds between ticks.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Carts composed and dispatched in parallel within one tick.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Maximum candidates pulled from the store per tick.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            concurrency: default_concurrency(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_interval_secs() -> u64 {
    3600 // 1 hour
}

fn default_concurrency() -> usize {
    4
}

fn default_batch_size() -> usize {
    500
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("reclaim").join("reclaim.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("reclaim.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Outbound SMTP configuration.
///
/// When disabled, reminders go to a log-only transport.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    /// SMTP password. Prefer the `RECLAIM_SMTP_PASSWORD` env var.
    #[serde(default)]
    pub password: Option<String>,

    /// Sender address, e.g. `Shop <no-reply@shop.example>`.
    #[serde(default)]
    pub from_address: Option<String>,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: None,
            port: default_smtp_port(),
            username: None,
            password: None,
            from_address: None,
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}
