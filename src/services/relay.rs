// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client for the external AI completion endpoint.
//!
//! Each relay is exactly one POST; nothing here retries. Failures are
//! classified into `UpstreamError` (transport, non-2xx, undecodable body)
//! and `EmptyUpstreamReply` (2xx without a reply, under the reject policy).

use crate::config::{Config, EmptyReplyPolicy, EMPTY_REPLY_PLACEHOLDER};
use crate::error::AppError;
use axum::http::header;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Body sent to the completion endpoint.
#[derive(Debug, Serialize)]
pub struct RelayRequest<'a> {
    pub message: &'a str,
    #[serde(rename = "planType")]
    pub plan_type: &'a str,
}

/// Successful response from the completion endpoint.
#[derive(Debug, Deserialize)]
pub struct UpstreamReply {
    #[serde(default)]
    pub reply: Option<String>,
}

/// Completion endpoint client.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: String,
    empty_reply_policy: EmptyReplyPolicy,
}

impl RelayClient {
    /// Create a client for `endpoint`. Every call is bounded by `timeout`.
    pub fn new(
        endpoint: String,
        timeout: Duration,
        empty_reply_policy: EmptyReplyPolicy,
    ) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            empty_reply_policy,
        })
    }

    /// Create a client from application config.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.upstream_url.clone(),
            config.upstream_timeout,
            config.empty_reply_policy,
        )
    }

    /// Send `message` upstream and return the generated text.
    ///
    /// `auth_forward` is copied verbatim into the upstream `Authorization`
    /// header; it is a passthrough, not authentication of this call.
    pub async fn relay(
        &self,
        message: &str,
        plan_type: &str,
        auth_forward: Option<&str>,
    ) -> Result<String, AppError> {
        let mut request = self.http.post(&self.endpoint).json(&RelayRequest {
            message,
            plan_type,
        });
        if let Some(auth) = auth_forward {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let response = request.send().await.map_err(|e| {
            let detail = if e.is_timeout() {
                "Upstream request timed out".to_string()
            } else {
                format!("Upstream request failed: {}", e)
            };
            AppError::UpstreamError {
                status: None,
                detail,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = if body.trim().is_empty() {
                format!("upstream returned HTTP {}", status.as_u16())
            } else {
                body
            };
            return Err(AppError::UpstreamError {
                status: Some(status.as_u16()),
                detail,
            });
        }

        let reply: UpstreamReply = response.json().await.map_err(|e| AppError::UpstreamError {
            status: Some(status.as_u16()),
            detail: format!("JSON parse error: {}", e),
        })?;

        self.apply_empty_reply_policy(reply.reply)
    }

    fn apply_empty_reply_policy(&self, reply: Option<String>) -> Result<String, AppError> {
        match reply.filter(|r| !r.trim().is_empty()) {
            Some(text) => Ok(text),
            None => match self.empty_reply_policy {
                EmptyReplyPolicy::Reject => Err(AppError::EmptyUpstreamReply),
                EmptyReplyPolicy::Placeholder => {
                    tracing::warn!("Upstream reply empty, substituting placeholder");
                    Ok(EMPTY_REPLY_PLACEHOLDER.to_string())
                }
            },
        }
    }
}
