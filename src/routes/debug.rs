// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Development-only routes for inspecting and resetting the profile store.
//!
//! Mounted only when `ENABLE_DEBUG_ROUTES=true`.

use crate::error::Result;
use crate::models::Profile;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/debug/all-users", get(all_users))
        .route("/debug/seed", get(seed_one))
        .route("/debug/seed-many", get(seed_many))
        .route("/debug/clear", get(clear))
}

#[derive(Serialize)]
pub struct SeedResponse {
    pub seeded: Vec<String>,
}

#[derive(Serialize)]
pub struct ClearResponse {
    pub deleted: u64,
}

async fn all_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Profile>>> {
    Ok(Json(state.store.list_all().await?))
}

async fn seed_one(State(state): State<Arc<AppState>>) -> Result<Json<SeedResponse>> {
    seed(&state, &fixtures()[..1]).await
}

async fn seed_many(State(state): State<Arc<AppState>>) -> Result<Json<SeedResponse>> {
    seed(&state, &fixtures()).await
}

async fn seed(state: &AppState, profiles: &[Profile]) -> Result<Json<SeedResponse>> {
    let mut seeded = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let mut profile = profile.clone();
        // Keep any plan or failure already recorded for a fixture
        if let Some(existing) = state.store.find_by_name(&profile.name).await? {
            profile.plan_text = existing.plan_text;
            profile.last_error = existing.last_error;
        }
        state.store.upsert(&profile).await?;
        seeded.push(profile.name);
    }
    tracing::info!(count = seeded.len(), "Seeded profiles");
    Ok(Json(SeedResponse { seeded }))
}

async fn clear(State(state): State<Arc<AppState>>) -> Result<Json<ClearResponse>> {
    let deleted = state.store.delete_all().await?;
    tracing::warn!(deleted, "Cleared profile store");
    Ok(Json(ClearResponse { deleted }))
}

#[allow(clippy::too_many_arguments)]
fn fixture(
    name: &str,
    phone: &str,
    age: u32,
    gender: &str,
    goal: &str,
    bmi: f64,
    diet_type: &str,
    duration_label: &str,
) -> Profile {
    Profile {
        name: name.to_string(),
        phone: Some(phone.to_string()),
        age,
        gender: gender.to_string(),
        goal: goal.to_string(),
        bmi,
        diet_type: diet_type.to_string(),
        duration_label: duration_label.to_string(),
        plan_text: None,
        last_error: None,
        updated_at: None,
    }
}

fn fixtures() -> Vec<Profile> {
    vec![
        fixture("alice", "5550100", 29, "female", "weight loss", 26.3, "vegetarian", "7 days"),
        fixture("bob", "5550101", 41, "male", "muscle gain", 23.8, "high protein", "30 days"),
        fixture("carol", "5550102", 63, "female", "heart health", 28.9, "mediterranean", "14 days"),
    ]
}
