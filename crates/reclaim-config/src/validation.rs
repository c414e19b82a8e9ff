// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks run after deserialization.
//!
//! Every rule is evaluated so the operator sees all problems at once.

use crate::diagnostic::ConfigError;
use crate::model::ReclaimConfig;

/// Validate a deserialized configuration, collecting every failure.
pub fn validate_config(config: &ReclaimConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let recovery = &config.recovery;

    if recovery.subject.trim().is_empty() {
        errors.push(ConfigError::invalid("recovery.subject", "must not be empty"));
    }

    if recovery.template_id.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "recovery.template_id",
            "must not be empty",
        ));
    }

    let base = recovery.recovery_base_url.trim();
    let has_scheme = ["http://", "https://"]
        .iter()
        .any(|scheme| base.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if !has_scheme {
        errors.push(ConfigError::invalid(
            "recovery.recovery_base_url",
            format!("`{base}` must be an absolute http(s) URL"),
        ));
    }

    if recovery.recovery_link_expiry_days < 1 {
        errors.push(ConfigError::invalid(
            "recovery.recovery_link_expiry_days",
            "must be at least 1",
        ));
    }

    if config.scheduler.interval_secs < 1 {
        errors.push(ConfigError::invalid(
            "scheduler.interval_secs",
            "must be at least 1",
        ));
    }

    if config.scheduler.concurrency < 1 {
        errors.push(ConfigError::invalid(
            "scheduler.concurrency",
            "must be at least 1",
        ));
    }

    if config.scheduler.batch_size < 1 {
        errors.push(ConfigError::invalid(
            "scheduler.batch_size",
            "must be at least 1",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "storage.database_path",
            "must not be empty",
        ));
    }

    if config.smtp.enabled {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        if blank(&config.smtp.host) {
            errors.push(ConfigError::invalid(
                "smtp.host",
                "required when smtp.enabled = true",
            ));
        }
        if blank(&config.smtp.from_address) {
            errors.push(ConfigError::invalid(
                "smtp.from_address",
                "required when smtp.enabled = true",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(errors: &[ConfigError]) -> Vec<String> {
        errors
            .iter()
            .filter_map(|e| match e {
                ConfigError::Validation { key, .. } => Some(key.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&ReclaimConfig::default()).is_ok());
    }

    #[test]
    fn all_failures_are_collected() {
        let mut config = ReclaimConfig::default();
        config.recovery.subject = "  ".into();
        config.recovery.recovery_base_url = "ftp://shop".into();
        config.scheduler.concurrency = 0;
        config.storage.database_path = String::new();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            keys(&errors),
            vec![
                "recovery.subject",
                "recovery.recovery_base_url",
                "scheduler.concurrency",
                "storage.database_path",
            ]
        );
    }

    #[test]
    fn smtp_requires_host_and_sender_when_enabled() {
        let mut config = ReclaimConfig::default();
        config.smtp.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(keys(&errors), vec!["smtp.host", "smtp.from_address"]);

        config.smtp.host = Some("smtp.example.com".into());
        config.smtp.from_address = Some("shop@example.com".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_expiry_is_rejected() {
        let mut config = ReclaimConfig::default();
        config.recovery.recovery_link_expiry_days = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(keys(&errors), vec!["recovery.recovery_link_expiry_days"]);
    }

    #[test]
    fn zero_max_emails_is_allowed() {
        // A cap of zero simply means no reminder ever fires.
        let mut config = ReclaimConfig::default();
        config.recovery.max_recovery_emails = 0;
        assert!(validate_config(&config).is_ok());
    }
}
