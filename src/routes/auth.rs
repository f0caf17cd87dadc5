// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential issuance route.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::issue_credential;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/login", post(login))
}

/// Login request body. `username` is accepted as an alias.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default, alias = "username")]
    #[validate(length(max = 128))]
    principal: Option<String>,
}

/// Issued credential.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub credential: String,
}

/// Issue a one-hour credential for the named principal.
async fn login(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let Json(body) = body?;
    body.validate()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let principal = body
        .principal
        .ok_or_else(|| AppError::InvalidInput("principal is required".to_string()))?;

    let credential = issue_credential(&principal, &state.config.jwt_signing_key)?;

    tracing::info!(principal = %principal.trim(), "Credential issued");

    Ok(Json(LoginResponse { credential }))
}
