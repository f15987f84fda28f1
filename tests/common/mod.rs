// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Utc};
use gym_checkin::config::Config;
use gym_checkin::db::{FirestoreDb, MemoryStore};
use gym_checkin::models::Gym;
use gym_checkin::routes::create_router;
use gym_checkin::time_utils::FixedClock;
use gym_checkin::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Parse an RFC3339 timestamp.
#[allow(dead_code)]
pub fn parse_time(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .expect("valid RFC3339 timestamp")
        .with_timezone(&Utc)
}

/// Gym `G` with QR token `GYM-42`.
#[allow(dead_code)]
pub fn test_gym() -> Gym {
    Gym {
        id: "G".to_string(),
        name: "Iron Works".to_string(),
        city: "Lisbon".to_string(),
        qr_token: "GYM-42".to_string(),
        deactivated_at: None,
    }
}

/// Memory store seeded with [`test_gym`].
#[allow(dead_code)]
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.upsert_gym(test_gym()).expect("seed gym");
    store
}

/// Everything a test needs to drive the API.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: MemoryStore,
    pub clock: Arc<FixedClock>,
}

/// Create a test app backed by a seeded memory store and a fixed clock.
#[allow(dead_code)]
pub fn create_test_app(now: &str) -> TestApp {
    let config = Config::test_default();
    let store = seeded_store();
    let clock = Arc::new(FixedClock::new(parse_time(now)));

    let state = Arc::new(AppState::new(
        config,
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        clock.clone(),
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        clock,
    }
}

/// Create a session token the auth middleware accepts.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    gym_checkin::middleware::auth::create_jwt(user_id, signing_key).expect("Failed to create JWT")
}
