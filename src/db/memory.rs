// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process profile store for local development and tests.

use super::ProfileStore;
use crate::error::AppError;
use crate::models::{PlanRecord, Profile};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Arc, Mutex};

/// Profile store backed by a `DashMap`.
///
/// Each instance owns its own maps; clones share them. Per-entry updates are
/// atomic, matching the per-document guarantee of the Firestore backend.
#[derive(Clone, Default)]
pub struct MemoryStore {
    profiles: Arc<DashMap<String, Profile>>,
    plans: Arc<Mutex<Vec<PlanRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every recorded plan, oldest first.
    pub fn plans(&self) -> Result<Vec<PlanRecord>, AppError> {
        self.plans
            .lock()
            .map(|plans| plans.clone())
            .map_err(|_| AppError::StoreUnavailable("plans lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.profiles.get(name).map(|entry| entry.value().clone()))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Profile>, AppError> {
        Ok(self
            .profiles
            .iter()
            .find(|entry| entry.value().phone.as_deref() == Some(phone))
            .map(|entry| entry.value().clone()))
    }

    async fn upsert(&self, profile: &Profile) -> Result<Profile, AppError> {
        let mut profile = profile.clone();
        profile.updated_at = Some(now_rfc3339());
        self.profiles.insert(profile.name.clone(), profile.clone());
        Ok(profile)
    }

    async fn set_plan(&self, name: &str, plan_text: &str) -> Result<Profile, AppError> {
        let mut entry = self
            .profiles
            .get_mut(name)
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", name)))?;

        entry.plan_text = Some(plan_text.to_string());
        entry.last_error = None;
        entry.updated_at = Some(now_rfc3339());
        Ok(entry.value().clone())
    }

    async fn set_last_error(&self, name: &str, error: &str) -> Result<(), AppError> {
        let mut entry = self
            .profiles
            .get_mut(name)
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", name)))?;

        entry.last_error = Some(error.to_string());
        entry.updated_at = Some(now_rfc3339());
        Ok(())
    }

    async fn record_plan(&self, record: &PlanRecord) -> Result<(), AppError> {
        self.plans
            .lock()
            .map_err(|_| AppError::StoreUnavailable("plans lock poisoned".to_string()))?
            .push(record.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Profile>, AppError> {
        let mut profiles: Vec<Profile> = self
            .profiles
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let count = self.profiles.len() as u64;
        self.profiles.clear();
        Ok(count)
    }
}
