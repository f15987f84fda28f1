// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process record store for tests and local development.

use crate::db::{check_in_for_window, CheckInLog, GymDirectory, InsertOutcome, StoreError};
use crate::models::{CheckIn, Gym};
use crate::time_utils::DayWindow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// DashMap-backed store.
///
/// The check-in map is keyed by `CheckIn::key`, so the entry API gives the
/// same insert-if-absent guarantee a unique key gives in Firestore.
#[derive(Clone, Default)]
pub struct MemoryStore {
    gyms: Arc<DashMap<String, Gym>>,
    /// qr_token -> gym id
    tokens: Arc<DashMap<String, String>>,
    check_ins: Arc<DashMap<String, CheckIn>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or update a gym.
    ///
    /// Fails if the QR token already belongs to a different gym, including
    /// deactivated ones, or if the update would change the gym's token.
    pub fn upsert_gym(&self, gym: Gym) -> Result<(), StoreError> {
        self.check_online()?;

        if let Some(existing) = self.gyms.get(&gym.id) {
            if existing.qr_token != gym.qr_token {
                return Err(StoreError::Backend(format!(
                    "QR token of gym {} is immutable",
                    gym.id
                )));
            }
        }

        match self.tokens.entry(gym.qr_token.clone()) {
            Entry::Occupied(owner) if owner.get() != &gym.id => {
                return Err(StoreError::Backend(format!(
                    "QR token already assigned to gym {}",
                    owner.get()
                )));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(gym.id.clone());
            }
        }

        self.gyms.insert(gym.id.clone(), gym);
        Ok(())
    }

    /// Load gyms from a JSON array file (same shape as the `gyms` collection).
    pub fn load_gyms_from_file<P: AsRef<Path>>(&self, path: P) -> Result<usize, StoreError> {
        let json_data = fs::read_to_string(path.as_ref())
            .map_err(|e| StoreError::Backend(format!("Failed to read gym seed file: {}", e)))?;
        self.load_gyms_from_json(&json_data)
    }

    /// Load gyms from a JSON array string. Returns the number loaded.
    pub fn load_gyms_from_json(&self, json_data: &str) -> Result<usize, StoreError> {
        let gyms: Vec<Gym> = serde_json::from_str(json_data)
            .map_err(|e| StoreError::Backend(format!("Failed to parse gym seed: {}", e)))?;

        let count = gyms.len();
        for gym in gyms {
            self.upsert_gym(gym)?;
        }

        tracing::info!(count, "Loaded gyms");
        Ok(count)
    }

    /// Simulate losing the backend: every operation fails with `Offline`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn check_in_count(&self) -> usize {
        self.check_ins.len()
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Offline);
        }
        Ok(())
    }
}

#[async_trait]
impl GymDirectory for MemoryStore {
    async fn find_by_qr_token(&self, token: &str) -> Result<Option<Gym>, StoreError> {
        self.check_online()?;

        let Some(gym_id) = self.tokens.get(token).map(|id| id.value().clone()) else {
            return Ok(None);
        };
        Ok(self
            .gyms
            .get(&gym_id)
            .map(|gym| gym.value().clone())
            .filter(|gym| gym.qr_token == token))
    }
}

#[async_trait]
impl CheckInLog for MemoryStore {
    async fn insert_if_absent(
        &self,
        user_id: &str,
        gym_id: &str,
        timestamp: DateTime<Utc>,
        window: DayWindow,
    ) -> Result<InsertOutcome, StoreError> {
        self.check_online()?;

        let record = check_in_for_window(user_id, gym_id, timestamp, window)?;
        match self.check_ins.entry(record.id.clone()) {
            Entry::Occupied(existing) => Ok(InsertOutcome::Conflict(existing.get().clone())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(InsertOutcome::Inserted(record))
            }
        }
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<CheckIn>, StoreError> {
        self.check_online()?;

        let mut records: Vec<CheckIn> = self
            .check_ins
            .iter()
            .filter(|entry| entry.value().user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }
}
