// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inclusive calendar-date ranges for analytics queries.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use reclaim_core::ReclaimError;
use serde::Serialize;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Stored timestamps only order lexically for four-digit years, so the
/// exclusive end bound (midnight after `end`) must stay within year 9999.
const LAST_END_YEAR: i32 = 9999;

/// A closed `[start, end]` range of UTC calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Parse two `YYYY-MM-DD` dates. Rejects malformed dates, `start > end`,
    /// and an `end` of 9999-12-31 or later.
    pub fn parse(start: &str, end: &str) -> Result<Self, ReclaimError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        Self::new(start, end)
    }

    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReclaimError> {
        if start > end {
            return Err(ReclaimError::InvalidInput(format!(
                "range start {start} is after range end {end}"
            )));
        }
        if end.succ_opt().is_none_or(|next| next.year() > LAST_END_YEAR) {
            return Err(ReclaimError::InvalidInput(format!(
                "range end {end} is out of range; the last supported end date is 9999-12-30"
            )));
        }
        Ok(Self { start, end })
    }

    /// First instant of the range.
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// First instant after the range: midnight following `end`.
    pub fn end_instant(&self) -> DateTime<Utc> {
        self.end
            .succ_opt()
            .unwrap_or(NaiveDate::MAX)
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    /// Number of calendar days covered.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ReclaimError> {
    let raw = raw.trim();
    // chrono accepts unpadded fields; require the canonical width.
    if raw.len() != 10 {
        return Err(ReclaimError::InvalidInput(format!(
            "`{raw}` is not a YYYY-MM-DD date"
        )));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| ReclaimError::InvalidInput(format!("`{raw}` is not a valid date: {e}")))
}
