// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: collaborator traits plus Firestore and in-memory backends.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::models::{CheckIn, Gym};
use crate::time_utils::DayWindow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Collection names as constants.
pub mod collections {
    pub const GYMS: &str = "gyms";
    /// Keyed by `CheckIn::key` so one document exists per (user, gym, day)
    pub const CHECK_INS: &str = "check_ins";
}

/// Errors from the record store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Database not connected (offline mode)")]
    Offline,

    #[error("{0}")]
    Backend(String),
}

/// Result of a conditional insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// No record existed for the (user, gym, day); this one was stored.
    Inserted(CheckIn),
    /// A record already existed; nothing was written.
    Conflict(CheckIn),
}

/// Build the record a conditional insert stores.
///
/// The timestamp must fall inside the window, otherwise the record's key day
/// would disagree with when it happened.
pub(crate) fn check_in_for_window(
    user_id: &str,
    gym_id: &str,
    timestamp: DateTime<Utc>,
    window: DayWindow,
) -> Result<CheckIn, StoreError> {
    if !window.contains(timestamp) {
        return Err(StoreError::Backend(format!(
            "Check-in at {} is outside the window for {}",
            timestamp, window.day
        )));
    }
    Ok(CheckIn::new(user_id, gym_id, window.day, timestamp))
}

/// Read access to gyms by QR token.
#[async_trait]
pub trait GymDirectory: Send + Sync {
    /// Exact-match lookup; the token is never parsed.
    async fn find_by_qr_token(&self, token: &str) -> Result<Option<Gym>, StoreError>;
}

/// Append-only log of accepted check-ins.
#[async_trait]
pub trait CheckInLog: Send + Sync {
    /// Atomically store a check-in unless one already exists for the same
    /// user, gym and day window. Fails if `timestamp` is outside `window`.
    async fn insert_if_absent(
        &self,
        user_id: &str,
        gym_id: &str,
        timestamp: DateTime<Utc>,
        window: DayWindow,
    ) -> Result<InsertOutcome, StoreError>;

    /// All check-ins of a user across gyms, newest first.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<CheckIn>, StoreError>;
}
