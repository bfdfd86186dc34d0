//! Ramp API authentication: static bearer tokens and the `OAuth2`
//! client-credentials grant.

use crate::config::RampConfig;
use crate::error::{RampError, RampResult};
use reqwest::RequestBuilder;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Refresh this long before the server-declared expiry.
const EXPIRY_MARGIN_SECS: u64 = 30;

/// Credentials used to authorize Ramp API calls.
///
/// The [`Debug`] impl redacts secrets.
#[derive(Clone)]
pub enum RampCredentials {
    /// A token issued out of band.
    AccessToken { token: String },

    /// `OAuth2` client credentials exchanged at the token endpoint.
    ClientCredentials {
        client_id: String,
        client_secret: String,
        token_endpoint: String,
        scopes: Vec<String>,
    },
}

impl RampCredentials {
    /// Pick credentials from a config; a static token wins over client credentials.
    #[must_use]
    pub fn from_config(config: &RampConfig) -> Self {
        match config.access_token.as_deref() {
            Some(token) if !token.is_empty() => Self::AccessToken {
                token: token.to_string(),
            },
            _ => Self::ClientCredentials {
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.clone(),
                token_endpoint: config.token_endpoint(),
                scopes: config.scopes.clone(),
            },
        }
    }
}

impl std::fmt::Debug for RampCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AccessToken { .. } => f
                .debug_struct("AccessToken")
                .field("token", &"[REDACTED]")
                .finish(),
            Self::ClientCredentials {
                client_id,
                token_endpoint,
                scopes,
                ..
            } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .field("token_endpoint", token_endpoint)
                .field("scopes", scopes)
                .finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() >= exp)
    }
}

/// Authentication handler shared by every request a client makes.
#[derive(Debug, Clone)]
pub struct RampAuth {
    credentials: RampCredentials,
    /// Shared across clones so one exchange serves every handle.
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    http_client: reqwest::Client,
}

impl RampAuth {
    #[must_use]
    pub fn new(credentials: RampCredentials, http_client: reqwest::Client) -> Self {
        Self {
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Current bearer token, exchanging client credentials when the cache is
    /// empty or expired.
    pub async fn get_bearer_token(&self) -> RampResult<String> {
        match &self.credentials {
            RampCredentials::AccessToken { token } => Ok(token.clone()),
            RampCredentials::ClientCredentials {
                client_id,
                client_secret,
                token_endpoint,
                scopes,
            } => {
                {
                    let cache = self.cached_token.read().await;
                    if let Some(cached) = cache.as_ref().filter(|c| !c.is_expired()) {
                        return Ok(cached.access_token.clone());
                    }
                }

                debug!("Requesting Ramp access token from {}", token_endpoint);
                let scope = scopes.join(" ");
                let mut form = vec![("grant_type", "client_credentials")];
                if !scopes.is_empty() {
                    form.push(("scope", scope.as_str()));
                }

                let response = self
                    .http_client
                    .post(token_endpoint)
                    .basic_auth(client_id, Some(client_secret))
                    .form(&form)
                    .send()
                    .await
                    .map_err(|e| RampError::AuthError(format!("Token request failed: {e}")))?;

                let status = response.status();
                if !status.is_success() {
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "<no body>".to_string());
                    return Err(RampError::AuthError(format!(
                        "Token endpoint returned {status}: {body}"
                    )));
                }

                let token: TokenResponse = response.json().await.map_err(|e| {
                    RampError::AuthError(format!("Failed to parse token response: {e}"))
                })?;

                let expires_at = token.expires_in.map(|secs| {
                    Instant::now() + Duration::from_secs(secs.saturating_sub(EXPIRY_MARGIN_SECS))
                });

                let mut cache = self.cached_token.write().await;
                *cache = Some(CachedToken {
                    access_token: token.access_token.clone(),
                    expires_at,
                });

                Ok(token.access_token)
            }
        }
    }

    /// Attach `Authorization: Bearer <token>` to a request.
    pub async fn apply(&self, builder: RequestBuilder) -> RampResult<RequestBuilder> {
        let token = self.get_bearer_token().await?;
        Ok(builder.bearer_auth(token))
    }

    /// Drop the cached token (after a 401).
    pub async fn invalidate_cache(&self) {
        let mut cache = self.cached_token.write().await;
        *cache = None;
    }
}
