// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential issuance and JWT authentication middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How long an issued credential stays valid.
pub const CREDENTIAL_LIFETIME_SECS: usize = 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (principal name)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated principal extracted from the credential.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub principal: String,
}

/// Middleware that requires a valid credential in the `Authorization` header.
///
/// A missing credential is rejected with 403, a bad or expired one with 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let principal = verify_credential(auth_header, &state.config.jwt_signing_key)?;
    tracing::debug!(principal = %principal, "Credential verified");

    request.extensions_mut().insert(AuthUser { principal });

    Ok(next.run(request).await)
}

/// Verify raw `Authorization` header material and return the principal.
///
/// Accepts both `Bearer <token>` and a bare `<token>`.
pub fn verify_credential(
    header_value: Option<&str>,
    signing_key: &[u8],
) -> Result<String, AppError> {
    let token = header_value
        .map(strip_bearer)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingCredential)?;

    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Credential rejected");
        AppError::InvalidCredential
    })?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(AppError::InvalidCredential);
    }

    Ok(token_data.claims.sub)
}

fn strip_bearer(value: &str) -> &str {
    let value = value.trim();
    match value.get(..7) {
        Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => value[7..].trim(),
        _ => value,
    }
}

/// Create a credential for `principal`, valid for [`CREDENTIAL_LIFETIME_SECS`].
pub fn issue_credential(principal: &str, signing_key: &[u8]) -> Result<String, AppError> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let principal = principal.trim();
    if principal.is_empty() {
        return Err(AppError::InvalidInput("principal is required".to_string()));
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_secs() as usize;

    let claims = Claims {
        sub: principal.to_string(),
        iat: now,
        exp: now + CREDENTIAL_LIFETIME_SECS,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(|e| AppError::Internal(e.into()))
}
