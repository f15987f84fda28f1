// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting, day windows and clocks.
//!
//! All calendar arithmetic happens in a single fixed UTC offset (the
//! deployment's "local" time). Fixed offsets have no DST transitions, so
//! every local day is exactly 24 hours long.

use chrono::{
    DateTime, Datelike, Days, Duration, FixedOffset, NaiveDate, NaiveTime, SecondsFormat, Utc,
};
use std::sync::atomic::{AtomicI64, Ordering};

/// Largest UTC offset (in minutes) accepted for the local day boundary.
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Build a fixed offset from whole minutes east of UTC.
///
/// Returns `None` outside of ±14 hours.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    if minutes.abs() > MAX_OFFSET_MINUTES {
        return None;
    }
    FixedOffset::east_opt(minutes * 60)
}

/// Local calendar date of an instant.
pub fn local_day(ts: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    ts.with_timezone(&offset).date_naive()
}

/// UTC instant of local midnight at the start of `day`.
pub fn local_midnight(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = day.and_time(NaiveTime::MIN);
    (local - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// Most recent local Sunday 00:00 at or before `now`.
pub fn week_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let today = local_day(now, offset);
    let back = u64::from(today.weekday().num_days_from_sunday());
    let sunday = today.checked_sub_days(Days::new(back)).unwrap_or(today);
    local_midnight(sunday, offset)
}

/// Half-open interval `[start, end)` covering one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub day: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn for_day(day: NaiveDate, offset: FixedOffset) -> Self {
        let start = local_midnight(day, offset);
        Self {
            day,
            start,
            end: start + Duration::days(1),
        }
    }

    /// The window of the local day that contains `now`.
    pub fn containing(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self::for_day(local_day(now, offset), offset)
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

/// Source of "now" for every time-dependent decision.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock of the server.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for simulations and tests.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(now.timestamp_millis()),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        self.millis.store(now.timestamp_millis(), Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}
