// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end check-in attempt: scanner, validator and notification sink.
//!
//! The flow holds the scanner mutably while a validation is in flight, so
//! nothing can stop the session or feed it another payload until the
//! validator has answered.

use crate::error::CheckInRejection;
use crate::models::CheckIn;
use crate::services::scanner::{Camera, ScannerError, ScannerSession};
use crate::services::validator::CheckInValidator;
use std::sync::Arc;

/// Result of one validated scan, as shown to the user.
pub type CheckInOutcome = Result<CheckIn, CheckInRejection>;

/// Presentation sink for check-in results (toasts, banners).
pub trait Notifier: Send + Sync {
    fn notify(&self, outcome: &CheckInOutcome);
}

/// Notifier that only logs; used when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, outcome: &CheckInOutcome) {
        match outcome {
            Ok(record) => tracing::info!(
                user_id = %record.user_id,
                gym_id = %record.gym_id,
                "Check-in succeeded"
            ),
            Err(rejection) => tracing::info!(
                code = rejection.code(),
                retryable = rejection.is_retryable(),
                "Check-in failed"
            ),
        }
    }
}

/// Drives one scanner session through repeated check-in attempts.
pub struct CheckInFlow<C: Camera> {
    scanner: ScannerSession<C>,
    validator: CheckInValidator,
    notifier: Arc<dyn Notifier>,
}

impl<C: Camera> CheckInFlow<C> {
    pub fn new(camera: C, validator: CheckInValidator, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            scanner: ScannerSession::new(camera),
            validator,
            notifier,
        }
    }

    pub fn scanner(&self) -> &ScannerSession<C> {
        &self.scanner
    }

    /// Run one attempt: open the camera, wait for a code, validate it and
    /// release the camera.
    ///
    /// Camera failures are returned as `Err` and leave the scanner `Idle`.
    /// Validation results, including rejections, are returned as `Ok` and
    /// also sent to the notifier. Without a (non-blank) user no camera is
    /// opened.
    pub async fn run_once(
        &mut self,
        user_id: Option<&str>,
    ) -> Result<CheckInOutcome, ScannerError> {
        let Some(user_id) = user_id.map(str::trim).filter(|id| !id.is_empty()) else {
            let outcome = Err(CheckInRejection::NotAuthenticated);
            self.notifier.notify(&outcome);
            return Ok(outcome);
        };

        if let Err(err) = self.scanner.start().await {
            self.scanner.stop();
            return Err(err);
        }

        let payload = match self.scanner.scan().await {
            Ok(payload) => payload,
            Err(err) => {
                self.scanner.stop();
                return Err(err);
            }
        };

        let outcome = self.validator.validate(Some(user_id), &payload).await;
        let outcome = self.scanner.complete(outcome)?;

        self.notifier.notify(&outcome);
        Ok(outcome)
    }

    /// User-initiated cancel. Safe in any state.
    pub fn cancel(&mut self) {
        self.scanner.stop();
    }
}
