// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Gyms (QR token lookup, admin upsert)
//! - Check-ins (conditional insert, per-user history)

use crate::db::{
    check_in_for_window, collections, CheckInLog, GymDirectory, InsertOutcome, StoreError,
};
use crate::models::{CheckIn, Gym};
use crate::time_utils::DayWindow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firestore::errors::FirestoreError;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        // The emulator rejects real credentials, so skip the credential lookup
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            StoreError::Backend(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            StoreError::Backend(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore (Emulator)");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return `StoreError::Offline`.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client.as_ref().ok_or(StoreError::Offline)
    }

    // ─── Gym Operations ──────────────────────────────────────────

    /// Create or update a gym document.
    ///
    /// Token uniqueness is owned by gym management; this is only used for
    /// seeding and tests.
    pub async fn upsert_gym(&self, gym: &Gym) -> Result<(), StoreError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::GYMS)
            .document_id(&gym.id)
            .object(gym)
            .execute()
            .await
            .map_err(backend)?;
        Ok(())
    }

    // ─── Check-In Operations ─────────────────────────────────────

    /// Get a check-in by its key.
    pub async fn get_check_in(&self, id: &str) -> Result<Option<CheckIn>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::CHECK_INS)
            .obj()
            .one(id)
            .await
            .map_err(backend)
    }
}

#[async_trait]
impl GymDirectory for FirestoreDb {
    async fn find_by_qr_token(&self, token: &str) -> Result<Option<Gym>, StoreError> {
        let token = token.to_string();
        let gyms: Vec<Gym> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::GYMS)
            .filter(move |q| q.for_all([q.field("qr_token").eq(token.clone())]))
            .limit(2)
            .obj()
            .query()
            .await
            .map_err(backend)?;

        single_gym(gyms)
    }
}

/// A token resolves to at most one gym; more than one is a broken directory.
fn single_gym(gyms: Vec<Gym>) -> Result<Option<Gym>, StoreError> {
    let mut gyms = gyms.into_iter();
    let first = gyms.next();
    if let Some(other) = gyms.next() {
        let first_id = first.map(|g| g.id).unwrap_or_default();
        tracing::error!(
            gym_id = %first_id,
            other_gym_id = %other.id,
            "Multiple gyms share one QR token"
        );
        return Err(StoreError::Backend(format!(
            "QR token is shared by gyms {} and {}",
            first_id, other.id
        )));
    }
    Ok(first)
}

#[async_trait]
impl CheckInLog for FirestoreDb {
    /// Uses create semantics on the deterministic document ID: Firestore
    /// rejects the write with `AlreadyExists` if the day's document exists,
    /// so two concurrent scans cannot both succeed.
    async fn insert_if_absent(
        &self,
        user_id: &str,
        gym_id: &str,
        timestamp: DateTime<Utc>,
        window: DayWindow,
    ) -> Result<InsertOutcome, StoreError> {
        let record = check_in_for_window(user_id, gym_id, timestamp, window)?;

        let result: Result<CheckIn, FirestoreError> = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::CHECK_INS)
            .document_id(&record.id)
            .object(&record)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted(record)),
            Err(FirestoreError::DataConflictError(_)) => {
                let existing = self.get_check_in(&record.id).await?.ok_or_else(|| {
                    StoreError::Backend(format!(
                        "Check-in {} conflicted but could not be read back",
                        record.id
                    ))
                })?;
                Ok(InsertOutcome::Conflict(existing))
            }
            Err(e) => Err(backend(e)),
        }
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<CheckIn>, StoreError> {
        let user_id = user_id.to_string();
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CHECK_INS)
            .filter(move |q| q.for_all([q.field("user_id").eq(user_id.clone())]))
            .order_by([("timestamp", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(backend)
    }
}

fn backend(err: FirestoreError) -> StoreError {
    StoreError::Backend(err.to_string())
}
