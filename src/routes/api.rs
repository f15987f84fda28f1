// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{CheckIn, EngagementSnapshot};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const MAX_HISTORY: u32 = 500;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/checkins", get(list_check_ins).post(create_check_in))
        .route("/api/engagement", get(get_engagement))
}

// ─── Check-Ins ───────────────────────────────────────────────

/// Body of a scan submission.
#[derive(Deserialize, Validate)]
struct CheckInRequest {
    /// Decoded QR payload, passed through untouched
    #[validate(length(min = 1, max = 512, message = "payload must be 1-512 characters"))]
    payload: String,
}

/// Accepted check-in.
#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckInResponse {
    pub id: String,
    pub gym_id: String,
    /// Local calendar day (YYYY-MM-DD)
    pub local_day: String,
    pub checked_in_at: String,
}

impl From<CheckIn> for CheckInResponse {
    fn from(record: CheckIn) -> Self {
        Self {
            id: record.id,
            gym_id: record.gym_id,
            local_day: record.local_day.format("%Y-%m-%d").to_string(),
            checked_in_at: format_utc_rfc3339(record.timestamp),
        }
    }
}

/// Submit a decoded QR payload for the current user.
async fn create_check_in(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<CheckInResponse>)> {
    request
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let record = state
        .validator
        .validate(Some(&user.user_id), &request.payload)
        .await?;

    Ok((StatusCode::CREATED, Json(record.into())))
}

#[derive(Deserialize)]
struct HistoryQuery {
    /// Maximum number of check-ins to return (newest first)
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_limit() -> u32 {
    100
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CheckInHistoryResponse {
    pub check_ins: Vec<CheckInResponse>,
    /// Total number of check-ins, before `limit` is applied
    pub total: u32,
}

/// List the current user's check-ins, newest first.
async fn list_check_ins(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<CheckInHistoryResponse>> {
    if params.limit == 0 {
        return Err(AppError::BadRequest(
            "limit must be greater than 0".to_string(),
        ));
    }
    let limit = params.limit.min(MAX_HISTORY) as usize;

    tracing::debug!(user_id = %user.user_id, limit, "Fetching check-in history");

    let records = state.check_in_log.list_for_user(&user.user_id).await?;
    let total = u32::try_from(records.len()).unwrap_or(u32::MAX);

    Ok(Json(CheckInHistoryResponse {
        check_ins: records
            .into_iter()
            .take(limit)
            .map(CheckInResponse::from)
            .collect(),
        total,
    }))
}

// ─── Engagement ──────────────────────────────────────────────

/// Streak and visit counters for the current user.
///
/// Computed from the full log on every request.
async fn get_engagement(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<EngagementSnapshot>> {
    let records = state.check_in_log.list_for_user(&user.user_id).await?;
    let snapshot = state.engagement.compute(&records, state.clock.now());

    tracing::debug!(
        user_id = %user.user_id,
        streak = snapshot.current_streak_days,
        total = snapshot.total_visits,
        "Computed engagement"
    );

    Ok(Json(snapshot))
}
