//! Mock Ramp API server using wiremock.
//!
//! Serves the developer API under `/developer/v1` so clients exercise the
//! same relative paths they use in production.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use ramp_client::auth::{RampAuth, RampCredentials};
use ramp_client::client::RampClient;

use super::test_data::{task_status_json, user_page_json};

pub const API_PREFIX: &str = "/developer/v1";
pub const TEST_TOKEN: &str = "test-token-123";

/// Replays a fixed list of responses, repeating the last one once exhausted.
pub struct SequenceResponder {
    responses: Vec<ResponseTemplate>,
    calls: Arc<AtomicUsize>,
}

impl SequenceResponder {
    pub fn new(responses: Vec<ResponseTemplate>) -> Self {
        Self {
            responses,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl Respond for SequenceResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        let last = self.responses.len().saturating_sub(1);
        self.responses
            .get(idx.min(last))
            .cloned()
            .unwrap_or_else(|| ResponseTemplate::new(500))
    }
}

pub struct MockRampServer {
    server: MockServer,
}

impl MockRampServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// API root as a client would be configured with.
    pub fn base_url(&self) -> String {
        format!("{}{API_PREFIX}", self.server.uri())
    }

    /// Absolute URL for an API path, as Ramp returns in `page.next`.
    pub fn url(&self, rel: &str) -> String {
        format!("{}/{}", self.base_url(), rel.trim_start_matches('/'))
    }

    pub fn api_path(rel: &str) -> String {
        format!("{API_PREFIX}/{}", rel.trim_start_matches('/'))
    }

    /// Client with a static bearer token and no retries.
    pub fn client(&self) -> RampClient {
        let auth = RampAuth::new(
            RampCredentials::AccessToken {
                token: TEST_TOKEN.to_string(),
            },
            reqwest::Client::new(),
        );
        RampClient::with_http_client(self.base_url(), auth, reqwest::Client::new())
    }

    /// Client using the client-credentials grant against this server.
    pub fn oauth_client(&self, client_id: &str, client_secret: &str) -> RampClient {
        let auth = RampAuth::new(
            RampCredentials::ClientCredentials {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
                token_endpoint: self.url("token"),
                scopes: vec!["users:read".to_string(), "users:write".to_string()],
            },
            reqwest::Client::new(),
        );
        RampClient::with_http_client(self.base_url(), auth, reqwest::Client::new())
    }

    // =========================================================================
    // Token endpoint
    // =========================================================================

    pub async fn mock_token(&self, access_token: &str, expires_in: u64) {
        Mock::given(method("POST"))
            .and(path(Self::api_path("token")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": access_token,
                "token_type": "Bearer",
                "expires_in": expires_in,
                "scope": "users:read users:write"
            })))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// `GET /users` returning a single page.
    pub async fn mock_list_users(&self, users: Vec<Value>, next: Option<&str>) {
        Mock::given(method("GET"))
            .and(path(Self::api_path("users")))
            .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_page_json(users, next)))
            .mount(&self.server)
            .await;
    }

    /// `POST /users/deferred` accepting any invite.
    pub async fn mock_create_invite(&self, task_id: &str) {
        Mock::given(method("POST"))
            .and(path(Self::api_path("users/deferred")))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": task_id })))
            .mount(&self.server)
            .await;
    }

    /// `GET /users/deferred/status/{task_id}` with a fixed status.
    pub async fn mock_task_status(&self, task_id: &str, status: &str, user_id: Option<&str>) {
        Mock::given(method("GET"))
            .and(path(Self::api_path(&format!(
                "users/deferred/status/{task_id}"
            ))))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(task_status_json(task_id, status, user_id)),
            )
            .mount(&self.server)
            .await;
    }

    /// Respond to any request on `method_name path` with the given status and body.
    pub async fn mock_error(&self, method_name: &str, rel: &str, status: u16, body: Value) {
        Mock::given(method(method_name))
            .and(path(Self::api_path(rel)))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }
}
