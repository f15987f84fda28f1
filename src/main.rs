// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gym Check-In API Server
//!
//! Accepts QR check-ins from member devices and serves visit history and
//! streaks.

use gym_checkin::{
    config::{Config, StoreBackend},
    db::{CheckInLog, FirestoreDb, GymDirectory, MemoryStore},
    time_utils::SystemClock,
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        utc_offset = %config.utc_offset,
        "Starting Gym Check-In API"
    );

    let (gyms, check_in_log): (Arc<dyn GymDirectory>, Arc<dyn CheckInLog>) =
        match config.store_backend {
            StoreBackend::Firestore => {
                let db = Arc::new(
                    FirestoreDb::new(&config.gcp_project_id)
                        .await
                        .expect("Failed to connect to Firestore"),
                );
                (db.clone(), db)
            }
            StoreBackend::Memory => {
                let store = Arc::new(MemoryStore::new());
                if let Some(path) = &config.gym_seed_file {
                    tracing::info!(path = %path, "Loading gym seed");
                    store
                        .load_gyms_from_file(path)
                        .expect("Failed to load gym seed");
                }
                tracing::warn!("Using in-memory store; check-ins are lost on restart");
                (store.clone(), store)
            }
        };

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        gyms,
        check_in_log,
        Arc::new(SystemClock),
    ));

    // Build router
    let app = gym_checkin::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gym_checkin=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
