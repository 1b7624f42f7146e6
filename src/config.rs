//! Client configuration

use crate::constants::{LOCAL_DEV_BASE_URL, REFRESH_PATH};
use crate::error::{ClientError, Result};
use std::time::Duration;

/// Environment variable holding a full API base URL
pub const BASE_URL_ENV: &str = "ADMIN_API_BASE_URL";

/// Environment variable holding the backend subdomain
pub const BACKEND_SUBDOMAIN_ENV: &str = "BACKEND_SUBDOMAIN";

/// Where the API lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API origin, always ending with `/`
    pub base_url: String,
}

impl ClientConfig {
    /// Create a config for an explicit base URL
    ///
    /// A trailing `/` is appended when missing so that paths such as
    /// `token/refresh/` can be concatenated directly.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ClientError::Configuration("base_url is required".into()));
        }

        let base_url = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };

        Ok(Self { base_url })
    }

    /// Resolve the base URL from the process environment
    ///
    /// Resolution order:
    /// 1. `ADMIN_API_BASE_URL`, used verbatim
    /// 2. `BACKEND_SUBDOMAIN`, expanded to `https://{sub}.aomail.ai/aomail/`
    /// 3. the local development origin
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(base_url) = non_empty(BASE_URL_ENV) {
            return Self::new(base_url);
        }

        if let Some(subdomain) = non_empty(BACKEND_SUBDOMAIN_ENV) {
            return Self::new(subdomain_base_url(subdomain.trim()));
        }

        Self::new(LOCAL_DEV_BASE_URL)
    }

    /// Join a relative API path onto the base URL
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Production base URL for a backend subdomain
pub fn subdomain_base_url(subdomain: &str) -> String {
    format!("https://{subdomain}.aomail.ai/aomail/")
}

/// Configuration for the authenticated client
#[derive(Debug, Clone)]
pub struct AuthClientConfig {
    /// Refresh endpoint path, relative to the base URL
    /// Default: `token/refresh/`
    pub refresh_path: String,

    /// Share one refresh call between concurrent 401 responses
    /// Default: false (every 401 refreshes on its own, last write wins)
    pub single_flight_refresh: bool,

    /// Request timeout handed to the HTTP client
    /// Default: none, the transport default applies
    pub timeout: Option<Duration>,
}

impl AuthClientConfig {
    pub fn new(single_flight_refresh: bool, timeout: Option<Duration>) -> Self {
        Self {
            single_flight_refresh,
            timeout,
            ..Self::default()
        }
    }
}

impl Default for AuthClientConfig {
    fn default() -> Self {
        Self {
            refresh_path: REFRESH_PATH.to_string(),
            single_flight_refresh: false,
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_falls_back_to_local_dev() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.base_url, LOCAL_DEV_BASE_URL);
    }

    #[test]
    fn test_subdomain_expansion() {
        let config = ClientConfig::from_lookup(lookup(&[(BACKEND_SUBDOMAIN_ENV, "augustin")])).unwrap();
        assert_eq!(config.base_url, "https://augustin.aomail.ai/aomail/");
    }

    #[test]
    fn test_explicit_base_url_wins() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_ENV, "http://127.0.0.1:9000/api"),
            (BACKEND_SUBDOMAIN_ENV, "augustin"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "http://127.0.0.1:9000/api/");
        assert_eq!(config.url("is_admin/"), "http://127.0.0.1:9000/api/is_admin/");
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = ClientConfig::from_lookup(lookup(&[(BASE_URL_ENV, "  ")])).unwrap();
        assert_eq!(config.base_url, LOCAL_DEV_BASE_URL);
    }

    #[test]
    fn test_empty_base_url_rejected() {
        assert!(matches!(ClientConfig::new(""), Err(ClientError::Configuration(_))));
    }

    #[test]
    fn test_auth_config_defaults() {
        let config = AuthClientConfig::default();
        assert_eq!(config.refresh_path, "token/refresh/");
        assert!(!config.single_flight_refresh);
        assert!(config.timeout.is_none());
    }
}
