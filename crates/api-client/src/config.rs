//! Client construction options

use std::time::Duration;

use reqwest::Url;

use crate::error::{ApiError, Result};

/// Login endpoint, relative to the base URL.
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login/";

/// Token refresh endpoint, relative to the base URL.
pub const DEFAULT_REFRESH_PATH: &str = "/auth/token/refresh/";

/// Registration endpoint, relative to the base URL.
pub const DEFAULT_REGISTER_PATH: &str = "/auth/register/";

/// Per-attempt HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for building an `ApiClient`.
///
/// `base_url` is required. `Default` leaves it unset so that forgetting it
/// fails at construction rather than talking to some fallback host.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub login_path: String,
    pub refresh_path: String,
    pub register_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            refresh_path: DEFAULT_REFRESH_PATH.to_owned(),
            register_path: DEFAULT_REGISTER_PATH.to_owned(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate and normalize the base URL.
    ///
    /// Returns the URL with any trailing slash removed so paths (which always
    /// start with `/`) can be appended directly.
    pub(crate) fn resolved_base(&self) -> Result<String> {
        let raw = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::Config("base_url is required".into()))?;

        let url = Url::parse(raw)
            .map_err(|e| ApiError::Config(format!("base_url {raw:?} is not an absolute URL: {e}")))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ApiError::Config(format!(
                "base_url must use http or https, got {}",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(ApiError::Config(format!("base_url {raw:?} has no host")));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ApiError::Config(format!(
                "base_url {raw:?} must not carry a query or fragment"
            )));
        }
        if self.timeout.is_zero() {
            return Err(ApiError::Config("timeout must be greater than 0".into()));
        }

        Ok(url.as_str().trim_end_matches('/').to_owned())
    }
}
