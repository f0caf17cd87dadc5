// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile store: the persistence seam used by the gateway.
//!
//! Two backends implement [`ProfileStore`]:
//! - [`FirestoreDb`] for deployments (and the Firestore emulator)
//! - [`MemoryStore`] for local development and tests
//!
//! Absence is reported as `Ok(None)`; every backend failure surfaces as
//! `AppError::StoreUnavailable`.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{PlanRecord, Profile};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    /// Profiles keyed by principal name
    pub const PROFILES: &str = "profiles";
    /// Generated plans, one document per persisted relay
    pub const PLANS: &str = "plans";
}

/// Document-oriented profile persistence.
///
/// `name` is the unique key: every write is an upsert keyed by it.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Profile>, AppError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Profile>, AppError>;

    /// Create or replace the profile stored under `profile.name`.
    async fn upsert(&self, profile: &Profile) -> Result<Profile, AppError>;

    /// Store a successful reply as the profile's plan and clear `last_error`.
    ///
    /// Fails with `NotFound` if no profile exists under `name`.
    async fn set_plan(&self, name: &str, plan_text: &str) -> Result<Profile, AppError>;

    /// Record a relay failure without touching `plan_text`.
    async fn set_last_error(&self, name: &str, error: &str) -> Result<(), AppError>;

    /// Append an entry to the plans collection.
    async fn record_plan(&self, record: &PlanRecord) -> Result<(), AppError>;

    async fn list_all(&self) -> Result<Vec<Profile>, AppError>;

    /// Delete every profile. Returns how many were removed.
    async fn delete_all(&self) -> Result<u64, AppError>;
}

/// Firestore document IDs may not contain `/`, so names are URL-encoded.
pub(crate) fn profile_doc_id(name: &str) -> String {
    urlencoding::encode(name).into_owned()
}
