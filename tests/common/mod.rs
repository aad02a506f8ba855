//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which builds an [`AppContext`] over in-memory
//! storage with auth enabled for two known users, and starts Axum on a random
//! port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use fragstore::config::{Config, StorageBackend, UserConfig};
use fragstore::server::{create_router, AppContext};
use fragstore::service::FragmentService;
use fragstore::storage::StorageGateway;

/// Username/password pairs known to the test server.
pub const ALICE: (&str, &str) = ("alice", "alice-password");
pub const BOB: (&str, &str) = ("bob", "bob-password");

/// API key configured for alice.
pub const ALICE_API_KEY: &str = "test-api-key-alice";

/// Test harness wrapping a fully-constructed [`AppContext`] backed by
/// in-memory storage.
pub struct TestHarness {
    pub ctx: AppContext,
}

impl TestHarness {
    /// Create a new harness with auth enabled for [`ALICE`] and [`BOB`].
    pub fn new() -> Self {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;
        config.server.auth.enabled = true;
        config.server.auth.users = vec![
            UserConfig {
                username: ALICE.0.to_string(),
                // bcrypt cost 4 keeps the test suite fast
                password_hash: bcrypt_hash(ALICE.1),
                api_key: Some(ALICE_API_KEY.to_string()),
            },
            UserConfig {
                username: BOB.0.to_string(),
                password_hash: bcrypt_hash(BOB.1),
                api_key: None,
            },
        ];

        let ctx = AppContext {
            service: FragmentService::new(StorageGateway::memory()),
            config: Arc::new(config),
        };

        Self { ctx }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }
}

fn bcrypt_hash(password: &str) -> String {
    bcrypt::hash(password, 4).expect("bcrypt hash")
}

/// Create a fragment as `user` and return the parsed response body.
pub async fn create_fragment(
    addr: SocketAddr,
    user: (&str, &str),
    content_type: &str,
    body: impl Into<reqwest::Body>,
) -> (reqwest::StatusCode, serde_json::Value) {
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/v1/fragments"))
        .basic_auth(user.0, Some(user.1))
        .header("Content-Type", content_type)
        .body(body)
        .send()
        .await
        .expect("POST /v1/fragments");
    let status = resp.status();
    let value = resp.json().await.unwrap_or(serde_json::Value::Null);
    (status, value)
}

/// Create a fragment as `user`, panicking unless it succeeds; returns its id.
pub async fn create_fragment_ok(
    addr: SocketAddr,
    user: (&str, &str),
    content_type: &str,
    body: &'static [u8],
) -> String {
    let (status, value) = create_fragment(addr, user, content_type, body).await;
    assert_eq!(status, 201, "create failed: {value}");
    value["fragment"]["id"].as_str().expect("fragment id").to_string()
}

/// GET a fragment path (`{id}`, `{id}.{ext}`, or `{id}/info`) as `user`.
pub async fn get_fragment(
    addr: SocketAddr,
    user: (&str, &str),
    path: &str,
) -> reqwest::Response {
    reqwest::Client::new()
        .get(format!("http://{addr}/v1/fragments/{path}"))
        .basic_auth(user.0, Some(user.1))
        .send()
        .await
        .expect("GET /v1/fragments/{path}")
}
