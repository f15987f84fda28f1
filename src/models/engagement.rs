// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Engagement snapshot derived from a user's check-in log.

use chrono::{DateTime, Utc};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Streak and visit counters.
///
/// Recomputed from the full log on every request; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EngagementSnapshot {
    /// Consecutive local days with at least one check-in
    pub current_streak_days: u32,
    /// Check-ins since `week_starts_at`
    pub visits_this_week: u32,
    pub total_visits: u32,
    /// Most recent check-in, if any
    pub last_visit_at: Option<DateTime<Utc>>,
    /// Local Sunday 00:00 the weekly counter starts from
    pub week_starts_at: DateTime<Utc>,
}
