// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Relay routes: free-form chat, stored-profile plans and bulk uploads.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::services::{BatchIngestor, BatchResult};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Routes that always require a credential.
/// The auth middleware is applied in routes/mod.rs.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Routes that look up a stored profile.
/// Auth is applied in routes/mod.rs only when `LOOKUP_REQUIRES_AUTH` is set.
pub fn lookup_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat/user/{identifier}", post(chat_for_user))
        .route("/chat/fromdb/{identifier}", post(plan_from_db))
        .route("/plan/{identifier}", get(get_plan))
}

/// Bulk upload route. Unauthenticated here; the caller's token is forwarded
/// upstream with every row.
pub fn batch_routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat/file", post(chat_file))
}

// ─── Free-form Chat ──────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(length(max = 8000))]
    message: Option<String>,
    #[serde(default, rename = "planType")]
    #[validate(length(max = 64))]
    plan_type: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ReplyResponse {
    pub reply: String,
}

/// Relay the caller's message upstream unchanged.
async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ReplyResponse>> {
    let Json(body) = body?;
    body.validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let message = body
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("message is required".to_string()))?;

    tracing::info!(
        principal = %user.principal,
        plan_type = %body.plan_type,
        "Relaying chat message"
    );

    let reply = state
        .gateway
        .relay_message(&user.principal, &message, &body.plan_type)
        .await?;

    Ok(Json(ReplyResponse { reply }))
}

// ─── Stored Profiles ─────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PlanResponse {
    pub name: String,
    pub plan: String,
}

/// Generate a plan for a stored profile and return it as a chat reply.
async fn chat_for_user(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
) -> Result<Json<ReplyResponse>> {
    let (_, reply) = state.gateway.relay_for_identifier(&identifier, None).await?;
    Ok(Json(ReplyResponse { reply }))
}

/// Generate a plan for a stored profile.
async fn plan_from_db(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
) -> Result<Json<PlanResponse>> {
    let (profile, plan) = state.gateway.relay_for_identifier(&identifier, None).await?;
    Ok(Json(PlanResponse {
        name: profile.name,
        plan,
    }))
}

/// Return the last stored plan without calling upstream.
async fn get_plan(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
) -> Result<Json<PlanResponse>> {
    let (name, plan) = state.gateway.latest_plan(&identifier).await?;
    Ok(Json(PlanResponse { name, plan }))
}

// ─── Bulk Upload ─────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BatchResponse {
    pub results: Vec<BatchResult>,
}

/// Generate plans for every row of an uploaded CSV.
///
/// Multipart fields:
/// - `file`: the CSV upload (required)
/// - `token`: forwarded upstream as `Authorization`; falls back to the
///   request's own `Authorization` header
async fn chat_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<BatchResponse>> {
    let mut file: Option<Vec<u8>> = None;
    let mut token: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Unreadable file: {}", e)))?;
                file = Some(bytes.to_vec());
            }
            "token" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Unreadable token: {}", e)))?;
                token = Some(text.trim().to_string()).filter(|t| !t.is_empty());
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::InvalidInput("file is required".to_string()))?;

    let auth_forward = token.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
    });

    let rows = BatchIngestor::parse(file)?;
    tracing::info!(forwarding_auth = auth_forward.is_some(), "Processing bulk upload");

    let results = state
        .gateway
        .relay_batch(rows, auth_forward.as_deref())
        .await;

    Ok(Json(BatchResponse { results }))
}
