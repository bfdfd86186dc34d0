//! Client configuration loading and validation.
//!
//! Configuration comes from an optional YAML file, then environment
//! variables (`RAMP_*`) override individual fields.

use crate::error::{RampError, RampResult};
use crate::retry::RetryPolicy;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Which Ramp deployment to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RampEnvironment {
    #[default]
    Production,
    Sandbox,
}

impl RampEnvironment {
    /// Developer API root for this deployment.
    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Production => "https://api.ramp.com/developer/v1",
            Self::Sandbox => "https://demo-api.ramp.com/developer/v1",
        }
    }

    fn parse(value: &str) -> RampResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "sandbox" | "demo" => Ok(Self::Sandbox),
            other => Err(RampError::InvalidConfig(format!(
                "unknown Ramp environment '{other}'"
            ))),
        }
    }
}

/// Ramp client configuration.
#[derive(Clone, Deserialize)]
pub struct RampConfig {
    #[serde(default)]
    pub environment: RampEnvironment,
    /// Overrides the environment's base URL when set.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Pre-issued bearer token; skips the client-credentials exchange.
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_secs: u64,
}

fn default_scopes() -> Vec<String> {
    vec!["users:read".to_string(), "users:write".to_string()]
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay() -> u64 {
    1
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            environment: RampEnvironment::default(),
            base_url: None,
            client_id: String::new(),
            client_secret: String::new(),
            access_token: None,
            scopes: default_scopes(),
            request_timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_secs: default_retry_base_delay(),
        }
    }
}

impl fmt::Debug for RampConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RampConfig")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("scopes", &self.scopes)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay_secs", &self.retry_base_delay_secs)
            .finish()
    }
}

impl RampConfig {
    /// Load from a YAML file and apply environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> RampResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RampError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse YAML without touching the environment.
    pub fn from_yaml(content: &str) -> RampResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| RampError::InvalidConfig(format!("invalid YAML config: {e}")))
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> RampResult<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override fields from `RAMP_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> RampResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from an arbitrary key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> RampResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(env) = lookup("RAMP_ENV") {
            self.environment = RampEnvironment::parse(&env)?;
        }
        if let Some(url) = lookup("RAMP_BASE_URL") {
            self.base_url = Some(url);
        }
        if let Some(id) = lookup("RAMP_CLIENT_ID") {
            self.client_id = id;
        }
        if let Some(secret) = lookup("RAMP_CLIENT_SECRET") {
            self.client_secret = secret;
        }
        if let Some(token) = lookup("RAMP_ACCESS_TOKEN") {
            self.access_token = Some(token);
        }
        if let Some(scopes) = lookup("RAMP_SCOPES") {
            self.scopes = scopes.split_whitespace().map(str::to_string).collect();
        }
        if let Some(timeout) = lookup("RAMP_TIMEOUT_SECS") {
            self.request_timeout_secs = timeout.parse().map_err(|_| {
                RampError::InvalidConfig(format!("RAMP_TIMEOUT_SECS is not a number: {timeout}"))
            })?;
        }
        if let Some(retries) = lookup("RAMP_MAX_RETRIES") {
            self.max_retries = retries.parse().map_err(|_| {
                RampError::InvalidConfig(format!("RAMP_MAX_RETRIES is not a number: {retries}"))
            })?;
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn resolved_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
            .trim_end_matches('/')
            .to_string()
    }

    /// Token endpoint for the client-credentials grant.
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        format!("{}/token", self.resolved_base_url())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_base_delay_secs)
    }

    /// Whether a static token is configured (takes precedence over client credentials).
    #[must_use]
    pub fn uses_static_token(&self) -> bool {
        self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn validate(&self) -> RampResult<()> {
        let base_url = self.resolved_base_url();
        let parsed = url::Url::parse(&base_url)
            .map_err(|e| RampError::InvalidConfig(format!("invalid base URL '{base_url}': {e}")))?;
        if parsed.scheme() != "https" && parsed.scheme() != "http" {
            return Err(RampError::InvalidConfig(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        if !self.uses_static_token()
            && (self.client_id.is_empty() || self.client_secret.is_empty())
        {
            return Err(RampError::InvalidConfig(
                "either an access token or a client id and secret are required".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(RampError::InvalidConfig(
                "request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
