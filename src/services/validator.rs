// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Check-in validation.
//!
//! Turns a decoded QR payload plus an authenticated user into a stored
//! check-in or a typed rejection:
//! 1. Resolve the gym by exact QR token match
//! 2. Derive today's local day window once, from server time
//! 3. Conditionally insert the check-in for (user, gym, day)

use crate::db::{CheckInLog, GymDirectory, InsertOutcome};
use crate::error::CheckInRejection;
use crate::models::CheckIn;
use crate::time_utils::{Clock, DayWindow};
use chrono::FixedOffset;
use std::sync::Arc;

/// Validates scans against the gym directory and the check-in log.
///
/// Never retries; the caller decides whether a rejection is worth retrying
/// (see [`CheckInRejection::is_retryable`]).
#[derive(Clone)]
pub struct CheckInValidator {
    gyms: Arc<dyn GymDirectory>,
    log: Arc<dyn CheckInLog>,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl CheckInValidator {
    pub fn new(
        gyms: Arc<dyn GymDirectory>,
        log: Arc<dyn CheckInLog>,
        clock: Arc<dyn Clock>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            gyms,
            log,
            clock,
            offset,
        }
    }

    /// Validate one scan for `user_id`.
    ///
    /// A missing or blank user ID fails closed before any lookup. Directory
    /// and log failures surface as `PersistenceFailure`.
    pub async fn validate(
        &self,
        user_id: Option<&str>,
        payload: &str,
    ) -> Result<CheckIn, CheckInRejection> {
        let user_id = match user_id.map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => {
                tracing::warn!("Check-in attempted without a user");
                return Err(CheckInRejection::NotAuthenticated);
            }
        };

        let gym = match self.gyms.find_by_qr_token(payload).await? {
            Some(gym) if gym.is_active() => gym,
            Some(gym) => {
                tracing::info!(user_id, gym_id = %gym.id, "Scan of deactivated gym");
                return Err(CheckInRejection::UnknownCode);
            }
            None => {
                tracing::info!(user_id, "Scan matched no gym");
                return Err(CheckInRejection::UnknownCode);
            }
        };

        // Read the clock once: the window and the stored timestamp must agree
        let now = self.clock.now();
        let window = DayWindow::containing(now, self.offset);

        match self
            .log
            .insert_if_absent(user_id, &gym.id, now, window)
            .await?
        {
            InsertOutcome::Inserted(record) => {
                tracing::info!(
                    user_id,
                    gym_id = %gym.id,
                    day = %window.day,
                    "Check-in accepted"
                );
                Ok(record)
            }
            InsertOutcome::Conflict(existing) => {
                tracing::info!(
                    user_id,
                    gym_id = %gym.id,
                    day = %window.day,
                    existing_at = %existing.timestamp,
                    "Already checked in today"
                );
                Err(CheckInRejection::AlreadyCheckedInToday {
                    checked_in_at: existing.timestamp,
                })
            }
        }
    }
}
