// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::Response;
use diet_gateway::config::Config;
use diet_gateway::db::{FirestoreDb, MemoryStore, ProfileStore};
use diet_gateway::models::Profile;
use diet_gateway::routes::create_router;
use diet_gateway::AppState;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the stub completion endpoint listens on.
#[allow(dead_code)]
pub const UPSTREAM_PATH: &str = "/ai/chat";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Test config whose relay calls go to `server`.
#[allow(dead_code)]
pub fn config_for(server: &MockServer) -> Config {
    Config {
        upstream_url: format!("{}{}", server.uri(), UPSTREAM_PATH),
        ..Config::test_default()
    }
}

/// Create a test app from a config and store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(
    config: Config,
    store: Arc<dyn ProfileStore>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config, store).expect("Failed to build app state"));
    (create_router(state.clone()), state)
}

/// Create a test app with an empty in-memory store relaying to `server`.
#[allow(dead_code)]
pub fn memory_app(server: &MockServer) -> (axum::Router, MemoryStore, Arc<AppState>) {
    let store = MemoryStore::new();
    let (app, state) = create_test_app(config_for(server), Arc::new(store.clone()));
    (app, store, state)
}

/// Stub completion endpoint answering every call with `reply`.
#[allow(dead_code)]
pub async fn upstream_replying(reply: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(UPSTREAM_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": reply })))
        .mount(&server)
        .await;
    server
}

/// Create a test JWT token whose expiry is `exp_offset_secs` from now.
#[allow(dead_code)]
pub fn create_test_jwt(principal: &str, signing_key: &[u8], exp_offset_secs: i64) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde::Serialize;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: principal.to_string(),
        exp: (now + exp_offset_secs) as usize,
        iat: (now + exp_offset_secs - 3600) as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// A complete profile with no plan.
#[allow(dead_code)]
pub fn sample_profile(name: &str) -> Profile {
    Profile {
        name: name.to_string(),
        phone: Some(format!("555-{}", name.len())),
        age: 34,
        gender: "female".to_string(),
        goal: "weight loss".to_string(),
        bmi: 27.4,
        diet_type: "vegetarian".to_string(),
        duration_label: "7 days".to_string(),
        plan_text: None,
        last_error: None,
        updated_at: None,
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
