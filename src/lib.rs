// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gym check-in: QR scan check-ins and visit streaks for gym members
//!
//! This crate provides the scanner session controller, the check-in
//! validator with its once-per-day rule, the engagement calculator, and
//! the HTTP API that exposes them.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{CheckInLog, GymDirectory};
use services::{CheckInValidator, EngagementCalculator};
use std::sync::Arc;
use time_utils::Clock;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub check_in_log: Arc<dyn CheckInLog>,
    pub validator: CheckInValidator,
    pub engagement: EngagementCalculator,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wire the services around a store and clock.
    pub fn new(
        config: Config,
        gyms: Arc<dyn GymDirectory>,
        check_in_log: Arc<dyn CheckInLog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let validator = CheckInValidator::new(
            gyms,
            check_in_log.clone(),
            clock.clone(),
            config.utc_offset,
        );
        let engagement = EngagementCalculator::new(config.utc_offset);

        Self {
            config,
            check_in_log,
            validator,
            engagement,
            clock,
        }
    }
}
