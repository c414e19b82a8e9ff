// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reminder transports: SMTP for delivery, a logging transport for dry runs.

pub mod dry_run;
pub mod smtp;

use std::sync::Arc;

use reclaim_config::SmtpConfig;
use reclaim_core::{MessageTransport, ReclaimError};

pub use dry_run::LogTransport;
pub use smtp::{SmtpLogin, SmtpTransport, build_message};

/// SMTP when `[smtp].enabled`, otherwise the logging transport.
pub fn transport_from_config(
    config: &SmtpConfig,
) -> Result<Arc<dyn MessageTransport>, ReclaimError> {
    if config.enabled {
        Ok(Arc::new(SmtpTransport::from_config(config)?))
    } else {
        Ok(Arc::new(LogTransport::new()))
    }
}
