// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan gateway: resolves profiles, relays prompts and persists replies.
//!
//! Each operation runs one request's pipeline:
//! 1. Resolve the profile (request body, store lookup, or upload row)
//! 2. Build the prompt
//! 3. Relay it upstream
//! 4. Persist the reply, or record the failure in `last_error`
//!
//! A failed relay never reaches `set_plan`, so a stored plan is always the
//! most recent successful reply.

use crate::config::Config;
use crate::db::ProfileStore;
use crate::error::{AppError, Result};
use crate::models::{BatchRow, PlanRecord, Profile};
use crate::services::prompt::build_prompt;
use crate::services::relay::RelayClient;
use crate::time_utils::now_rfc3339;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Outcome of one uploaded row: exactly one of `plan` or `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BatchResult {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Orchestrates the relay pipeline over an injected profile store.
#[derive(Clone)]
pub struct PlanGateway {
    store: Arc<dyn ProfileStore>,
    relay: RelayClient,
    trainer_principal_id: String,
    persist_chat_replies: bool,
}

impl PlanGateway {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        relay: RelayClient,
        trainer_principal_id: String,
        persist_chat_replies: bool,
    ) -> Self {
        Self {
            store,
            relay,
            trainer_principal_id,
            persist_chat_replies,
        }
    }

    /// Create a gateway from application config.
    pub fn from_config(config: &Config, store: Arc<dyn ProfileStore>) -> Result<Self> {
        Ok(Self::new(
            store,
            RelayClient::from_config(config)?,
            config.trainer_principal_id.clone(),
            config.persist_chat_replies,
        ))
    }

    /// Relay a caller-supplied message as-is, without prompt construction.
    pub async fn relay_message(
        &self,
        principal: &str,
        message: &str,
        plan_type: &str,
    ) -> Result<String> {
        let reply = self.relay.relay(message, plan_type, None).await?;

        if self.persist_chat_replies {
            self.record(principal, plan_type, &reply).await?;
            match self.store.set_plan(principal, &reply).await {
                Ok(_) => {}
                Err(AppError::NotFound(_)) => {
                    tracing::warn!(
                        principal = %principal,
                        "No profile for principal, chat reply kept in plans only"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Ok(reply)
    }

    /// Generate and store a plan for a stored profile.
    ///
    /// `identifier` is tried as a name, then as a phone number. An unknown
    /// identifier fails with `NotFound` before anything is sent upstream.
    pub async fn relay_for_identifier(
        &self,
        identifier: &str,
        auth_forward: Option<&str>,
    ) -> Result<(Profile, String)> {
        let profile = self.resolve_profile(identifier).await?;
        let reply = self.generate(&profile, auth_forward).await?;
        let updated = self.persist(&profile, &reply).await?;

        tracing::info!(name = %updated.name, "Plan generated from stored profile");
        Ok((updated, reply))
    }

    /// Generate plans for every uploaded row, one upstream call at a time.
    ///
    /// A failing row is reported inline and the batch carries on, so the
    /// result has one entry per input row, in order.
    pub async fn relay_batch<I>(&self, rows: I, auth_forward: Option<&str>) -> Vec<BatchResult>
    where
        I: IntoIterator<Item = std::result::Result<BatchRow, String>>,
    {
        let mut results = Vec::new();

        for (idx, row) in rows.into_iter().enumerate() {
            let fallback_name = format!("row {}", idx + 1);

            let row = match row {
                Ok(row) => row,
                Err(reason) => {
                    tracing::warn!(row = idx + 1, reason = %reason, "Skipping undecodable row");
                    results.push(BatchResult {
                        name: fallback_name,
                        plan: None,
                        error: Some(reason),
                    });
                    continue;
                }
            };

            let name = row
                .name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .unwrap_or(fallback_name);

            let result = match self.process_row(row, auth_forward).await {
                Ok(plan) => BatchResult {
                    name,
                    plan: Some(plan),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(row = idx + 1, name = %name, error = %e, "Batch row failed");
                    BatchResult {
                        name,
                        plan: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }

        let failed = results.iter().filter(|r| r.error.is_some()).count();
        tracing::info!(rows = results.len(), failed, "Batch relay complete");
        results
    }

    /// The most recently stored plan for a profile.
    pub async fn latest_plan(&self, identifier: &str) -> Result<(String, String)> {
        let profile = self.resolve_profile(identifier).await?;
        let plan = profile
            .plan_text
            .ok_or_else(|| AppError::NotFound(format!("No plan stored for {}", profile.name)))?;
        Ok((profile.name, plan))
    }

    async fn process_row(&self, row: BatchRow, auth_forward: Option<&str>) -> Result<String> {
        let profile = row.into_profile().map_err(AppError::InvalidInput)?;
        // Validate before writing so a bad row leaves the store untouched
        build_prompt(&profile)?;

        // Re-uploading a profile must not discard its existing plan
        let mut incoming = profile;
        if let Some(existing) = self.store.find_by_name(&incoming.name).await? {
            incoming.plan_text = existing.plan_text;
            incoming.last_error = existing.last_error;
        }
        let stored = self.store.upsert(&incoming).await?;

        let reply = self.generate(&stored, auth_forward).await?;
        self.persist(&stored, &reply).await?;
        Ok(reply)
    }

    async fn resolve_profile(&self, identifier: &str) -> Result<Profile> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(AppError::InvalidInput("identifier is required".to_string()));
        }

        if let Some(profile) = self.store.find_by_name(identifier).await? {
            return Ok(profile);
        }
        if let Some(profile) = self.store.find_by_phone(identifier).await? {
            return Ok(profile);
        }

        Err(AppError::NotFound(format!("Profile {} not found", identifier)))
    }

    /// Build the prompt and relay it. A relay failure is recorded in the
    /// profile's `last_error` before being returned.
    async fn generate(&self, profile: &Profile, auth_forward: Option<&str>) -> Result<String> {
        let prompt = build_prompt(profile)?;

        match self
            .relay
            .relay(&prompt, &profile.duration_label, auth_forward)
            .await
        {
            Ok(reply) => Ok(reply),
            Err(e) => {
                let recorded = self
                    .store
                    .set_last_error(&profile.name, &e.to_string())
                    .await;
                if let Err(store_err) = recorded {
                    tracing::warn!(
                        name = %profile.name,
                        error = %store_err,
                        "Failed to record relay failure"
                    );
                }
                Err(e)
            }
        }
    }

    /// Store the reply as the profile's plan, then append it to `plans`.
    ///
    /// Once `set_plan` succeeds the plan is served, so a failed history
    /// append is logged rather than reported as a failed relay.
    async fn persist(&self, profile: &Profile, reply: &str) -> Result<Profile> {
        let updated = self.store.set_plan(&profile.name, reply).await?;
        if let Err(e) = self
            .record(&profile.name, &profile.duration_label, reply)
            .await
        {
            tracing::warn!(name = %profile.name, error = %e, "Failed to record plan history");
        }
        Ok(updated)
    }

    async fn record(&self, created_for: &str, plan_type: &str, reply: &str) -> Result<()> {
        self.store
            .record_plan(&PlanRecord {
                created_by: self.trainer_principal_id.clone(),
                created_for: created_for.to_string(),
                plan_body: reply.to_string(),
                plan_type: plan_type.to_string(),
                created_at: now_rfc3339(),
            })
            .await
    }
}
