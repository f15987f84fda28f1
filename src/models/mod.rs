// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod checkin;
pub mod engagement;
pub mod gym;

pub use checkin::CheckIn;
pub use engagement::EngagementSnapshot;
pub use gym::Gym;
