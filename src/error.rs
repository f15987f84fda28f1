// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::db::StoreError;
use crate::time_utils::format_utc_rfc3339;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Why a scanned code did not produce a check-in.
///
/// Every variant reaches the caller intact so the UI can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckInRejection {
    /// Payload matched no (active) gym.
    #[error("Invalid QR code")]
    UnknownCode,

    /// Expected business outcome; carries the earlier check-in time.
    #[error("Already checked in today at {checked_in_at}")]
    AlreadyCheckedInToday { checked_in_at: DateTime<Utc> },

    /// The store failed. Safe to retry with the same payload.
    #[error("Check-in could not be stored: {0}")]
    PersistenceFailure(String),

    #[error("Authentication required")]
    NotAuthenticated,
}

impl CheckInRejection {
    /// Machine-readable code used in API responses.
    pub fn code(&self) -> &'static str {
        match self {
            CheckInRejection::UnknownCode => "unknown_code",
            CheckInRejection::AlreadyCheckedInToday { .. } => "already_checked_in_today",
            CheckInRejection::PersistenceFailure(_) => "persistence_failure",
            CheckInRejection::NotAuthenticated => "not_authenticated",
        }
    }

    /// Only transient store failures may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CheckInRejection::PersistenceFailure(_))
    }
}

impl From<StoreError> for CheckInRejection {
    fn from(err: StoreError) -> Self {
        CheckInRejection::PersistenceFailure(err.to_string())
    }
}

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Check-in rejected: {0}")]
    CheckIn(#[from] CheckInRejection),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Database(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    checked_in_at: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut checked_in_at = None;
        let mut retryable = false;

        let (status, error, details) = match &self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::CheckIn(rejection) => {
                retryable = rejection.is_retryable();
                let status = match rejection {
                    CheckInRejection::UnknownCode => StatusCode::NOT_FOUND,
                    CheckInRejection::AlreadyCheckedInToday { checked_in_at: at } => {
                        checked_in_at = Some(format_utc_rfc3339(*at));
                        StatusCode::CONFLICT
                    }
                    CheckInRejection::PersistenceFailure(msg) => {
                        tracing::error!(error = %msg, "Check-in persistence failure");
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    CheckInRejection::NotAuthenticated => StatusCode::UNAUTHORIZED,
                };
                // Store errors are logged above, not echoed to clients
                let details = (!retryable).then(|| rejection.to_string());
                (status, rejection.code(), details)
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            checked_in_at,
            retryable,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
