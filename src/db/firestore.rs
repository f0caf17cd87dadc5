// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Profiles (keyed by URL-encoded principal name)
//! - Plans (append-only record of generated plans)

use super::{collections, profile_doc_id, ProfileStore};
use crate::error::AppError;
use crate::models::{PlanRecord, Profile};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use firestore::paths;

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
            AppError::StoreUnavailable(format!("Failed to connect to Firestore: {}", e))
        })?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // The emulator accepts any bearer token, so hand it an unsigned one.
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
            AppError::StoreUnavailable(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return `StoreUnavailable` if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client.as_ref().ok_or_else(|| {
            AppError::StoreUnavailable("Database not connected (offline mode)".to_string())
        })
    }

    /// Write only `fields` of a profile document, leaving the rest as stored.
    async fn update_fields(&self, profile: &Profile, fields: Vec<String>) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::PROFILES)
            .document_id(profile_doc_id(&profile.name))
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete(&self, doc_ids: &[String], collection: &str) -> Result<(), AppError> {
        let client = self.get_client()?;

        for chunk in doc_ids.chunks(BATCH_SIZE) {
            let mut transaction = client.begin_transaction().await.map_err(|e| {
                AppError::StoreUnavailable(format!("Failed to begin transaction: {}", e))
            })?;

            for doc_id in chunk {
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::StoreUnavailable(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::StoreUnavailable(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FirestoreDb {
    async fn find_by_name(&self, name: &str) -> Result<Option<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::PROFILES)
            .obj()
            .one(&profile_doc_id(name))
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Profile>, AppError> {
        let phone = phone.to_string();
        let mut matches: Vec<Profile> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::PROFILES)
            .filter(move |q| q.for_all([q.field("phone").eq(phone.clone())]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        Ok(matches.pop())
    }

    async fn upsert(&self, profile: &Profile) -> Result<Profile, AppError> {
        let mut profile = profile.clone();
        profile.updated_at = Some(now_rfc3339());

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::PROFILES)
            .document_id(profile_doc_id(&profile.name))
            .object(&profile)
            .execute()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;

        Ok(profile)
    }

    async fn set_plan(&self, name: &str, plan_text: &str) -> Result<Profile, AppError> {
        let mut profile = self
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", name)))?;

        profile.plan_text = Some(plan_text.to_string());
        profile.last_error = None;
        profile.updated_at = Some(now_rfc3339());

        // Two successful relays racing resolve as last-writer-wins on plan_text
        self.update_fields(
            &profile,
            paths!(Profile::{plan_text, last_error, updated_at}),
        )
        .await?;
        Ok(profile)
    }

    async fn set_last_error(&self, name: &str, error: &str) -> Result<(), AppError> {
        let mut profile = self
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", name)))?;

        profile.last_error = Some(error.to_string());
        profile.updated_at = Some(now_rfc3339());

        // plan_text is outside the mask, so a concurrent set_plan is never undone
        self.update_fields(&profile, paths!(Profile::{last_error, updated_at}))
            .await
    }

    async fn record_plan(&self, record: &PlanRecord) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::PLANS)
            .generate_document_id()
            .object(record)
            .execute()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Profile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::PROFILES)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::StoreUnavailable(e.to_string()))
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let profiles = self.list_all().await?;
        let doc_ids: Vec<String> = profiles.iter().map(|p| profile_doc_id(&p.name)).collect();

        self.batch_delete(&doc_ids, collections::PROFILES).await?;

        tracing::info!(count = doc_ids.len(), "Deleted all profiles");
        Ok(doc_ids.len() as u64)
    }
}
