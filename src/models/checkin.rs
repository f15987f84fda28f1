// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Check-in record for storage and API.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One accepted visit of a user to a gym.
///
/// Created once per accepted scan; never updated or deleted by this service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    /// Deterministic key, see [`CheckIn::key`] (also used as document ID)
    pub id: String,
    pub user_id: String,
    pub gym_id: String,
    /// Local calendar day the check-in was accepted into
    pub local_day: NaiveDate,
    /// Server time of acceptance
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl CheckIn {
    /// Build the storage key for a (user, gym, local day) triple.
    ///
    /// Components are URL-encoded, so the `:` separator never appears
    /// inside one of them and distinct triples never share a key.
    pub fn key(user_id: &str, gym_id: &str, local_day: NaiveDate) -> String {
        format!(
            "{}:{}:{}",
            urlencoding::encode(user_id),
            urlencoding::encode(gym_id),
            local_day.format("%Y-%m-%d")
        )
    }

    pub fn new(
        user_id: &str,
        gym_id: &str,
        local_day: NaiveDate,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::key(user_id, gym_id, local_day),
            user_id: user_id.to_string(),
            gym_id: gym_id.to_string(),
            local_day,
            timestamp,
        }
    }
}
