// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gym directory entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A partner gym as seen by the check-in engine.
///
/// Written by gym management; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gym {
    /// Opaque gym ID (also used as document ID)
    pub id: String,
    /// Display name
    pub name: String,
    pub city: String,
    /// Token printed in the gym's QR code. Unique across all gyms, never reused.
    pub qr_token: String,
    /// Set when the gym was deactivated. The token stays reserved.
    #[serde(default)]
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl Gym {
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }
}
