// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod engagement;
pub mod scanner;
pub mod session;
pub mod validator;

pub use engagement::EngagementCalculator;
pub use scanner::{Camera, CameraError, MockCamera, ScannerError, ScannerPhase, ScannerSession};
pub use session::{CheckInFlow, CheckInOutcome, Notifier, TracingNotifier};
pub use validator::CheckInValidator;
