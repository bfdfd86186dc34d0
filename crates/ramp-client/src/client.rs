//! Ramp developer API HTTP client (reqwest-based).

use crate::auth::{RampAuth, RampCredentials};
use crate::config::RampConfig;
use crate::error::{RampError, RampResult};
use crate::retry::RetryPolicy;
use crate::users::Users;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("ramp-client/", env!("CARGO_PKG_VERSION"));

/// Ramp's structured error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_v2: Option<ErrorV2>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorV2 {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the Ramp developer API.
///
/// Cheap to clone; clones share the connection pool and token cache.
#[derive(Debug, Clone)]
pub struct RampClient {
    /// API root, e.g. `https://api.ramp.com/developer/v1`, no trailing slash.
    base_url: String,
    auth: RampAuth,
    http_client: Client,
    retry: RetryPolicy,
}

impl RampClient {
    /// Build a client from validated configuration.
    pub fn new(config: &RampConfig) -> RampResult<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RampError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;

        let auth = RampAuth::new(RampCredentials::from_config(config), http_client.clone());

        Ok(Self {
            base_url: config.resolved_base_url(),
            auth,
            http_client,
            retry: config.retry_policy(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client` and no retries (for testing).
    #[must_use]
    pub fn with_http_client(base_url: String, auth: RampAuth, http_client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
            http_client,
            retry: RetryPolicy::none(),
        }
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The users resource.
    #[must_use]
    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    /// Absolute URLs pass through untouched; paths are joined to the base URL.
    pub(crate) fn resolve(&self, path_or_url: &str) -> String {
        if path_or_url.starts_with("http://") || path_or_url.starts_with("https://") {
            path_or_url.to_string()
        } else {
            format!("{}/{}", self.base_url, path_or_url.trim_start_matches('/'))
        }
    }

    // ── Internal HTTP Methods ─────────────────────────────────────────

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path_or_url: &str,
        query: &[(&'static str, String)],
    ) -> RampResult<T> {
        let url = self.resolve(path_or_url);
        let url = url.as_str();
        self.retry
            .execute(&format!("GET {url}"), || async move {
                debug!("Ramp GET {} (query={:?})", url, query);
                let mut builder = self.http_client.get(url);
                if !query.is_empty() {
                    builder = builder.query(query);
                }
                let builder = self.auth.apply(builder).await?;
                let response = builder.send().await?;
                self.handle_response(response).await
            })
            .await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> RampResult<T> {
        let url = self.resolve(path);
        let url = url.as_str();
        self.retry
            .execute(&format!("POST {url}"), || async move {
                debug!("Ramp POST {}", url);
                let builder = self.http_client.post(url);
                let builder = self.auth.apply(builder).await?;
                let response = builder.json(body).send().await?;
                self.handle_response(response).await
            })
            .await
    }

    // ── Response Handling ─────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> RampResult<T> {
        if response.status().is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| RampError::ParseError(format!("Failed to parse response: {e}")))
        } else {
            Err(self.error_from_response(response).await)
        }
    }

    async fn error_from_response(&self, response: reqwest::Response) -> RampError {
        let status = response.status();

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        let detail = error_detail(status, &body);

        match status {
            StatusCode::NOT_FOUND => RampError::NotFound(detail),
            StatusCode::CONFLICT => RampError::Conflict(detail),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Ramp API rate limited, retry after {:?}s", retry_after);
                RampError::RateLimited {
                    retry_after_secs: retry_after,
                }
            }
            StatusCode::UNAUTHORIZED => {
                self.auth.invalidate_cache().await;
                RampError::AuthError(format!("Authentication failed (401): {detail}"))
            }
            _ => RampError::Api {
                status: status.as_u16(),
                detail,
            },
        }
    }
}

/// Human-readable detail from an error body: Ramp's message if present,
/// otherwise the raw body, otherwise the status line.
fn error_detail(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(v2) = parsed.error_v2 {
            match (v2.error_code, v2.message) {
                (Some(code), Some(message)) => return format!("{code}: {message}"),
                (None, Some(message)) => return message,
                (Some(code), None) => return code,
                (None, None) => {}
            }
        }
        if let Some(message) = parsed.message {
            return message;
        }
    }
    if body.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}
