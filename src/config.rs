use std::env;

use url::Url;

use crate::error::{Error, Result};

/// Connection settings for the e-hotels REST backend. Always passed into
/// [`crate::client::RestBackend`] explicitly; there is no process-wide
/// default base URL.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub request_timeout_seconds: u64,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_prefix: "/api".to_string(),
            request_timeout_seconds: 30,
        }
    }

    pub fn from_env() -> Self {
        Self {
            base_url: env_or("EHOTELS_API_BASE_URL", "http://localhost:8080"),
            api_prefix: normalize_prefix(&env_or("EHOTELS_API_PREFIX", "/api")),
            request_timeout_seconds: env_parse_or("EHOTELS_REQUEST_TIMEOUT_SECONDS", 30),
        }
    }

    /// Fully-joined API root, guaranteed to end with a slash so endpoint
    /// paths can be joined onto it.
    pub fn api_base(&self) -> Result<Url> {
        let base = self.base_url.trim_end_matches('/');
        let prefix = normalize_prefix(&self.api_prefix);
        Url::parse(&format!("{base}{prefix}/"))
            .map_err(|e| Error::Validation(format!("invalid backend base URL '{base}': {e}")))
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

fn env_parse_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    env_opt(key)
        .and_then(|raw| raw.parse::<T>().ok())
        .unwrap_or(default)
}

fn normalize_prefix(raw: &str) -> String {
    let mut prefix = raw.trim().to_string();
    if prefix.is_empty() {
        return "/api".to_string();
    }
    if !prefix.starts_with('/') {
        prefix.insert(0, '/');
    }
    while prefix.ends_with('/') && prefix.len() > 1 {
        prefix.pop();
    }
    prefix
}
