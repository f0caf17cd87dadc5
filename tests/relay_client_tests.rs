// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Relay client tests against a stub completion endpoint.

use diet_gateway::config::EmptyReplyPolicy;
use diet_gateway::error::AppError;
use diet_gateway::services::RelayClient;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, timeout: Duration) -> RelayClient {
    RelayClient::new(
        format!("{}/ai/chat", server.uri()),
        timeout,
        EmptyReplyPolicy::Reject,
    )
    .unwrap()
}

#[tokio::test]
async fn test_relay_sends_message_and_plan_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ai/chat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "message": "hello", "planType": "daily" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "hi there" })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server, Duration::from_secs(5))
        .relay("hello", "daily", None)
        .await
        .unwrap();

    assert_eq!(reply, "hi there");
}

#[tokio::test]
async fn test_relay_forwards_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "Bearer passthrough"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server, Duration::from_secs(5))
        .relay("hello", "daily", Some("Bearer passthrough"))
        .await
        .unwrap();

    assert_eq!(reply, "ok");
}

#[tokio::test]
async fn test_non_success_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("planType invalid"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .relay("hello", "daily", None)
        .await
        .unwrap_err();

    match err {
        AppError::UpstreamError { status, detail } => {
            assert_eq!(status, Some(422));
            assert_eq!(detail, "planType invalid");
        }
        other => panic!("expected UpstreamError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_success_without_body_gets_generic_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .relay("hello", "daily", None)
        .await
        .unwrap_err();

    match err {
        AppError::UpstreamError { detail, .. } => {
            assert_eq!(detail, "upstream returned HTTP 500");
        }
        other => panic!("expected UpstreamError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_timeout_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "reply": "too late" }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_millis(50))
        .relay("hello", "daily", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UpstreamError { status: None, .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_missing_reply_field_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "other": 1 })))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .relay("hello", "daily", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::EmptyUpstreamReply));
}

#[tokio::test]
async fn test_non_json_success_is_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .relay("hello", "daily", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::UpstreamError { status: Some(200), .. }));
}
