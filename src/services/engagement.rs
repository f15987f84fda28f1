// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Streak and visit counters derived from a user's check-in log.
//!
//! Nothing here is stored or updated incrementally; every snapshot is a pure
//! function of the log and "now".

use crate::models::{CheckIn, EngagementSnapshot};
use crate::time_utils::{local_day, week_start};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use std::collections::BTreeSet;

/// Computes [`EngagementSnapshot`]s in the deployment's local time.
#[derive(Debug, Clone, Copy)]
pub struct EngagementCalculator {
    offset: FixedOffset,
}

impl EngagementCalculator {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build a snapshot from all of a user's check-ins, in any order.
    pub fn compute(&self, check_ins: &[CheckIn], now: DateTime<Utc>) -> EngagementSnapshot {
        let week_starts_at = week_start(now, self.offset);

        let visits_this_week = check_ins
            .iter()
            .filter(|c| c.timestamp >= week_starts_at)
            .count();

        let days: BTreeSet<NaiveDate> = check_ins
            .iter()
            .map(|c| local_day(c.timestamp, self.offset))
            .collect();

        EngagementSnapshot {
            current_streak_days: current_streak(&days, local_day(now, self.offset)),
            visits_this_week: saturating_u32(visits_this_week),
            total_visits: saturating_u32(check_ins.len()),
            last_visit_at: check_ins.iter().map(|c| c.timestamp).max(),
            week_starts_at,
        }
    }
}

/// Count the consecutive days ending at the most recent visited day on or
/// before `today`.
///
/// This anchor gives:
/// - a visit today: the run ends today
/// - no visit today but one yesterday: the run ends yesterday, so a streak
///   is not reset before the day is over
/// - neither: the run ends at the last visit, however long ago
///
/// Days after `today` are ignored.
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(&anchor) = days.range(..=today).next_back() else {
        return 0;
    };

    let mut streak = 0;
    let mut day = Some(anchor);
    while let Some(d) = day.filter(|d| days.contains(d)) {
        streak += 1;
        day = d.pred_opt();
    }
    streak
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
