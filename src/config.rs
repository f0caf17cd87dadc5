//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup; secrets stay in memory for the life of
//! the process and are never mutated.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Text returned in place of an empty upstream reply under
/// [`EmptyReplyPolicy::Placeholder`].
pub const EMPTY_REPLY_PLACEHOLDER: &str = "⚠️ No reply";

/// Which profile store backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", s.to_string())),
        }
    }
}

/// What to do when the completion endpoint answers 2xx without a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReplyPolicy {
    /// Fail the relay with `EmptyUpstreamReply`.
    Reject,
    /// Substitute [`EMPTY_REPLY_PLACEHOLDER`] and treat it as success.
    Placeholder,
}

impl FromStr for EmptyReplyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(EmptyReplyPolicy::Reject),
            "placeholder" => Ok(EmptyReplyPolicy::Placeholder),
            _ => Err(ConfigError::Invalid("EMPTY_REPLY_POLICY", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Completion endpoint that relay calls are POSTed to
    pub upstream_url: String,
    /// GCP project hosting the Firestore profile store
    pub gcp_project_id: String,
    /// Profile store backend
    pub store_backend: StoreBackend,
    /// Server port
    pub port: u16,
    /// Identity recorded as `created_by` on persisted plans
    pub trainer_principal_id: String,
    /// Upper bound on a single upstream call
    pub upstream_timeout: Duration,
    /// Handling of 2xx upstream responses without a reply
    pub empty_reply_policy: EmptyReplyPolicy,
    /// Persist replies from `POST /chat`
    pub persist_chat_replies: bool,
    /// Require a credential on lookup and plan routes
    pub lookup_requires_auth: bool,
    /// Mount the `/debug/*` administrative routes
    pub enable_debug_routes: bool,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,

    // --- Secrets ---
    /// JWT signing key for credentials (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            upstream_url: "http://127.0.0.1:9/ai/chat".to_string(),
            gcp_project_id: "test-project".to_string(),
            store_backend: StoreBackend::Memory,
            port: 8080,
            trainer_principal_id: "trainer-test".to_string(),
            upstream_timeout: Duration::from_secs(5),
            empty_reply_policy: EmptyReplyPolicy::Reject,
            persist_chat_replies: false,
            lookup_requires_auth: false,
            enable_debug_routes: false,
            frontend_url: "http://localhost:5173".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let upstream_timeout_secs: u64 = parse_var("UPSTREAM_TIMEOUT_SECS", 60)?;

        Ok(Self {
            upstream_url: env::var("UPSTREAM_URL")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("UPSTREAM_URL"))?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            store_backend: parse_var("STORE_BACKEND", StoreBackend::Firestore)?,
            port: parse_var("PORT", 8080)?,
            trainer_principal_id: env::var("TRAINER_PRINCIPAL_ID")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| "trainer".to_string()),
            upstream_timeout: Duration::from_secs(upstream_timeout_secs),
            empty_reply_policy: parse_var("EMPTY_REPLY_POLICY", EmptyReplyPolicy::Reject)?,
            persist_chat_replies: parse_var("PERSIST_CHAT_REPLIES", false)?,
            lookup_requires_auth: parse_var("LOOKUP_REQUIRES_AUTH", false)?,
            enable_debug_routes: parse_var("ENABLE_DEBUG_ROUTES", false)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }
}

/// Read an optional variable, falling back to `default` when unset.
/// A set but unparsable value is an error rather than a silent default.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
