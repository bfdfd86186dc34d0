//! Integration tests for error mapping and retries.
//!
//! Tests cover:
//! - 400 / 403 / 404 / 409 / 422 / 429 / 5xx responses
//! - Ramp `error_v2` bodies and plain-text bodies
//! - Retries on transient failures, and exhaustion
//! - Client timeouts and unreachable hosts

mod helpers;

use helpers::mock_ramp_server::{MockRampServer, SequenceResponder};
use helpers::test_data::{unique_email, user_page_json};
use ramp_client::auth::{RampAuth, RampCredentials};
use ramp_client::client::RampClient;
use ramp_client::models::{CreateInviteRequest, ListUsersParams, UserRole};
use ramp_client::{RampError, RetryPolicy};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn invite() -> CreateInviteRequest {
    CreateInviteRequest::new(unique_email(), "Test", "User", UserRole::GuestUser)
}

// =============================================================================
// Status mapping
// =============================================================================

#[tokio::test]
async fn test_error_409_conflict_on_invite() {
    let server = MockRampServer::new().await;
    server
        .mock_error(
            "POST",
            "users/deferred",
            409,
            json!({ "error_v2": { "error_code": "DEVELOPER_409", "message": "Idempotency key reused" } }),
        )
        .await;

    let result = server.client().users().create_invite(&invite()).await;

    match result {
        Err(RampError::Conflict(detail)) => {
            assert_eq!(detail, "DEVELOPER_409: Idempotency key reused");
        }
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_422_validation_from_api() {
    let server = MockRampServer::new().await;
    server
        .mock_error(
            "POST",
            "users/deferred",
            422,
            json!({ "error_v2": { "message": "Email already belongs to a user" } }),
        )
        .await;

    let result = server.client().users().create_invite(&invite()).await;

    match result {
        Err(RampError::Api { status, detail }) => {
            assert_eq!(status, 422);
            assert_eq!(detail, "Email already belongs to a user");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_429_carries_retry_after() {
    let server = MockRampServer::new().await;

    Mock::given(method("GET"))
        .and(path(MockRampServer::api_path("users")))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "17"))
        .mount(server.server())
        .await;

    let result = server
        .client()
        .users()
        .list(&ListUsersParams::default())
        .await;

    assert!(matches!(
        result,
        Err(RampError::RateLimited {
            retry_after_secs: Some(17)
        })
    ));
}

#[tokio::test]
async fn test_error_500_plain_text_body() {
    let server = MockRampServer::new().await;

    Mock::given(method("GET"))
        .and(path(MockRampServer::api_path("users")))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(server.server())
        .await;

    let result = server
        .client()
        .users()
        .list(&ListUsersParams::default())
        .await;

    match result {
        Err(err @ RampError::Api { .. }) => {
            assert!(err.is_server_error());
            assert_eq!(
                err.to_string(),
                "Ramp API error (HTTP 500): Internal Server Error"
            );
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_empty_body_uses_status_line() {
    let server = MockRampServer::new().await;

    Mock::given(method("GET"))
        .and(path(MockRampServer::api_path("users")))
        .respond_with(ResponseTemplate::new(502))
        .mount(server.server())
        .await;

    let result = server
        .client()
        .users()
        .list(&ListUsersParams::default())
        .await;

    match result {
        Err(RampError::Api { status, detail }) => {
            assert_eq!(status, 502);
            assert_eq!(detail, "HTTP 502 Bad Gateway");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_success_body_is_parse_error() {
    let server = MockRampServer::new().await;

    Mock::given(method("GET"))
        .and(path(MockRampServer::api_path("users")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "not-a-list" })))
        .mount(server.server())
        .await;

    let result = server
        .client()
        .users()
        .list(&ListUsersParams::default())
        .await;

    assert!(matches!(result, Err(RampError::ParseError(_))));
}

// =============================================================================
// Retries
// =============================================================================

#[tokio::test]
async fn test_retries_transient_5xx_then_succeeds() {
    let server = MockRampServer::new().await;

    let responder = SequenceResponder::new(vec![
        ResponseTemplate::new(503),
        ResponseTemplate::new(502),
        ResponseTemplate::new(200).set_body_json(user_page_json(vec![], None)),
    ]);
    let calls = responder.call_counter();

    Mock::given(method("GET"))
        .and(path(MockRampServer::api_path("users")))
        .respond_with(responder)
        .mount(server.server())
        .await;

    let client = server.client().with_retry_policy(RetryPolicy::new(3, 0));
    let page = client
        .users()
        .list(&ListUsersParams::default())
        .await
        .unwrap();

    assert!(page.data.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_retries_rate_limit_honouring_retry_after() {
    let server = MockRampServer::new().await;

    let responder = SequenceResponder::new(vec![
        ResponseTemplate::new(429).insert_header("Retry-After", "0"),
        ResponseTemplate::new(201).set_body_json(json!({ "id": "task-after-429" })),
    ]);

    Mock::given(method("POST"))
        .and(path(MockRampServer::api_path("users/deferred")))
        .respond_with(responder)
        .mount(server.server())
        .await;

    let client = server.client().with_retry_policy(RetryPolicy::new(2, 5));
    let task = client.users().create_invite(&invite()).await.unwrap();
    assert_eq!(task.id, "task-after-429");
}

#[tokio::test]
async fn test_retry_exhaustion() {
    let server = MockRampServer::new().await;

    Mock::given(method("GET"))
        .and(path(MockRampServer::api_path("users")))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(server.server())
        .await;

    let client = server.client().with_retry_policy(RetryPolicy::new(2, 0));
    let result = client.users().list(&ListUsersParams::default()).await;

    match result {
        Err(RampError::MaxRetriesExceeded { attempts, message }) => {
            assert_eq!(attempts, 3);
            assert!(message.contains("503"));
        }
        other => panic!("expected MaxRetriesExceeded, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockRampServer::new().await;

    Mock::given(method("GET"))
        .and(path(MockRampServer::api_path("users/deferred/status/gone")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(server.server())
        .await;

    let client = server.client().with_retry_policy(RetryPolicy::new(3, 0));
    let result = client.users().fetch_deferred_task_status("gone").await;
    assert!(matches!(result, Err(RampError::NotFound(_))));
}

// =============================================================================
// Transport failures
// =============================================================================

#[tokio::test]
async fn test_request_timeout() {
    let server = MockRampServer::new().await;

    Mock::given(method("GET"))
        .and(path(MockRampServer::api_path("users")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(user_page_json(vec![], None))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(server.server())
        .await;

    let auth = RampAuth::new(
        RampCredentials::AccessToken {
            token: "t".to_string(),
        },
        reqwest::Client::new(),
    );
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let client = RampClient::with_http_client(server.base_url(), auth, http_client);

    let result = client.users().list(&ListUsersParams::default()).await;
    assert!(matches!(result, Err(RampError::Timeout(_))));
}

#[tokio::test]
async fn test_unreachable_host() {
    let auth = RampAuth::new(
        RampCredentials::AccessToken {
            token: "t".to_string(),
        },
        reqwest::Client::new(),
    );
    // Port 9 (discard) on loopback is closed on test machines.
    let client = RampClient::with_http_client(
        "http://127.0.0.1:9/developer/v1".to_string(),
        auth,
        reqwest::Client::new(),
    );

    let result = client.users().list(&ListUsersParams::default()).await;
    match result {
        Err(err @ RampError::Unreachable(_)) => assert!(err.is_retryable()),
        other => panic!("expected Unreachable, got {other:?}"),
    }
}
