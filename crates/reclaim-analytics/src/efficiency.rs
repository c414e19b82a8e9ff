// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;

use crate::stats::ratio;

/// Reminders sent versus recoveries that followed a reminder, in one range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReminderEfficiency {
    pub reminders_sent: u64,
    pub recovered_after_reminder: u64,
    /// `recovered_after_reminder / reminders_sent`, 0 when nothing was sent.
    pub conversion_rate: f64,
}

impl ReminderEfficiency {
    pub fn new(reminders_sent: u64, recovered_after_reminder: u64) -> Self {
        Self {
            reminders_sent,
            recovered_after_reminder,
            conversion_rate: ratio(recovered_after_reminder as f64, reminders_sent),
        }
    }
}
