//! Trailing report window
//!
//! The window always spans the seven full UTC days before the run date:
//! `start` is midnight UTC seven calendar days ago, `end` is midnight UTC
//! today. Activity after today's midnight is excluded.

use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;

/// Number of whole days covered by the window
pub const WINDOW_DAYS: i64 = 7;

/// Fixed time range shared by the metric and cost queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// Window for a run happening right now
    pub fn trailing_week() -> Self {
        Self::ending_at(Utc::now())
    }

    /// Window for a run executed at `now`
    pub fn ending_at(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let start_day = today - Duration::days(WINDOW_DAYS);

        Self {
            start: Utc.from_utc_datetime(&start_day.and_time(NaiveTime::MIN)),
            end: Utc.from_utc_datetime(&today.and_time(NaiveTime::MIN)),
        }
    }

    /// ISO-8601 start with an explicit `+00:00` offset
    pub fn start_iso(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    /// ISO-8601 end with an explicit `+00:00` offset
    pub fn end_iso(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, false)
    }
}
