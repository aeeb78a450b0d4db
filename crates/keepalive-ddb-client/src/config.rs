//! Store client configuration.
//!
//! Provides [`StoreConfig`], loadable from environment variables via
//! [`StoreConfig::from_env`] or assembled with its typed builder.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::retry::RetryPolicy;
use crate::signing::Credentials;

/// Store client configuration.
///
/// # Examples
///
/// ```
/// use keepalive_ddb_client::config::StoreConfig;
///
/// let config = StoreConfig::default();
/// assert_eq!(config.endpoint, "http://localhost:4566");
/// assert_eq!(config.max_attempts, 10);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    /// Service endpoint URL.
    #[builder(default = String::from("http://localhost:4566"))]
    pub endpoint: String,

    /// Region used for request signing.
    #[builder(default = String::from("us-east-1"))]
    pub region: String,

    /// Access key id; requests are unsigned when absent.
    #[builder(default, setter(strip_option, into))]
    pub access_key_id: Option<String>,

    /// Secret access key.
    #[builder(default, setter(strip_option, into))]
    #[serde(skip_serializing)]
    pub secret_access_key: Option<String>,

    /// Session token for temporary credentials.
    #[builder(default, setter(strip_option, into))]
    #[serde(skip_serializing)]
    pub session_token: Option<String>,

    /// Fixed pause between throttle retries, in milliseconds.
    #[builder(default = 1000)]
    pub throttle_backoff_ms: u64,

    /// Attempt ceiling for throttled calls, the first attempt included.
    #[builder(default = 10)]
    pub max_attempts: u32,

    /// Optional wall-clock ceiling for one call, in milliseconds.
    #[builder(default, setter(strip_option))]
    pub retry_deadline_ms: Option<u64>,

    /// Per-request HTTP timeout, in milliseconds.
    #[builder(default = 5000)]
    pub http_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `DYNAMODB_ENDPOINT` | `http://localhost:4566` |
    /// | `DEFAULT_REGION` | `us-east-1` |
    /// | `AWS_ACCESS_KEY_ID` | unset |
    /// | `AWS_SECRET_ACCESS_KEY` | unset |
    /// | `AWS_SESSION_TOKEN` | unset |
    /// | `DYNAMODB_THROTTLE_BACKOFF_MS` | `1000` |
    /// | `DYNAMODB_MAX_ATTEMPTS` | `10` |
    /// | `DYNAMODB_RETRY_DEADLINE_MS` | unset |
    /// | `DYNAMODB_HTTP_TIMEOUT_MS` | `5000` |
    ///
    /// Unparsable numbers fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StoreConfig::from_env`], reading variables through `lookup`.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = lookup("DYNAMODB_ENDPOINT") {
            config.endpoint = v;
        }
        if let Some(v) = lookup("DEFAULT_REGION") {
            config.region = v;
        }
        config.access_key_id = non_empty("AWS_ACCESS_KEY_ID");
        config.secret_access_key = non_empty("AWS_SECRET_ACCESS_KEY");
        config.session_token = non_empty("AWS_SESSION_TOKEN");
        if let Some(n) = env_parse(lookup("DYNAMODB_THROTTLE_BACKOFF_MS")) {
            config.throttle_backoff_ms = n;
        }
        if let Some(n) = env_parse(lookup("DYNAMODB_MAX_ATTEMPTS")) {
            config.max_attempts = n;
        }
        if let Some(n) = env_parse(lookup("DYNAMODB_RETRY_DEADLINE_MS")) {
            config.retry_deadline_ms = Some(n);
        }
        if let Some(n) = env_parse(lookup("DYNAMODB_HTTP_TIMEOUT_MS")) {
            config.http_timeout_ms = n;
        }

        config
    }

    /// The retry policy described by this configuration.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            backoff: Duration::from_millis(self.throttle_backoff_ms),
            max_attempts: self.max_attempts,
            deadline: self.retry_deadline_ms.map(Duration::from_millis),
        }
    }

    /// Signing credentials, when both key id and secret are configured.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(id), Some(secret)) => Some(Credentials {
                access_key_id: id.clone(),
                secret_access_key: secret.clone(),
                session_token: self.session_token.clone(),
            }),
            _ => None,
        }
    }

    /// HTTP timeout as a `Duration`.
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

fn env_parse<T: std::str::FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|v| v.trim().parse().ok())
}
