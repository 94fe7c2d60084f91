//! Authenticated API client with transparent token refresh
//!
//! Every call reads the access token from the session store and sends it as
//! a bearer credential. A 401 triggers one recovery pass: the refresh token
//! is exchanged for a new access token and the original request is re-sent
//! once. If no refresh token is stored or the refresh is rejected, the
//! session is cleared and the original 401 is returned.
//!
//! Refreshes are single-flight per client (a tokio Mutex), and refresh
//! results are written with the store's epoch compare-and-set so a late
//! refresh never overwrites a newer login.

use std::sync::Arc;
use std::time::Instant;

use common::Secret;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use session_store::{SessionStore, TokenPair};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::auth::{Credentials, LoginTokens, RefreshRequest, RefreshedTokens, Registration};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::metrics::{self, RefreshOutcome};
use crate::request::{ApiResponse, PendingRequest, decode_body};

/// Header carrying the per-call correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Which send of a logical request this is.
///
/// Passed by value into each send; only `First` may enter the refresh path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retry,
    /// Login, registration and the refresh call itself
    Direct,
}

impl Attempt {
    fn may_refresh(self) -> bool {
        matches!(self, Attempt::First)
    }

    fn label(self) -> &'static str {
        match self {
            Attempt::First => "first",
            Attempt::Retry => "retry",
            Attempt::Direct => "direct",
        }
    }
}

/// Status and decoded body of one HTTP exchange.
struct Reply {
    status: StatusCode,
    body: Value,
}

impl Reply {
    fn into_result(self) -> Result<ApiResponse> {
        if self.status.is_success() {
            Ok(ApiResponse {
                status: self.status,
                body: self.body,
            })
        } else {
            Err(ApiError::Status {
                status: self.status,
                body: self.body,
            })
        }
    }
}

struct Inner {
    http: reqwest::Client,
    /// Base URL as text, no trailing slash
    base: String,
    base_url: Url,
    config: ClientConfig,
    store: Arc<dyn SessionStore>,
    refresh_flight: Mutex<()>,
}

/// Client for the Q&A REST API.
///
/// Clone is cheap; clones share the connection pool, the session store and
/// the refresh single-flight lock.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Build a client. Fails if `config.base_url` is missing or invalid.
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("building HTTP client: {e}")))?;
        Self::with_http_client(config, store, http)
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_http_client(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        http: reqwest::Client,
    ) -> Result<Self> {
        let base = config.resolved_base()?;
        let base_url = Url::parse(&base)
            .map_err(|e| ApiError::Config(format!("base_url {base:?}: {e}")))?;
        info!(base_url = %base, "api client configured");
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base,
                base_url,
                config,
                store,
                refresh_flight: Mutex::new(()),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    /// Send `method path` with an optional JSON body.
    pub async fn request(&self, method: Method, path: &str, body: Option<Value>) -> Result<ApiResponse> {
        let mut request = PendingRequest::new(method, path);
        request.body = body;
        self.send(&request).await
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(&PendingRequest::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<ApiResponse> {
        self.send(&PendingRequest::post(path).body(body)).await
    }

    /// Send a request, recovering once from an expired access token.
    pub async fn send(&self, request: &PendingRequest) -> Result<ApiResponse> {
        let request_id = new_request_id();
        self.dispatch(request, &request_id).await
    }

    #[instrument(skip_all, fields(request_id = %request_id, method = %request.method, path = %request.path))]
    async fn dispatch(&self, request: &PendingRequest, request_id: &str) -> Result<ApiResponse> {
        let url = self.resolve(request)?;
        let session = self.inner.store.snapshot().await?;
        let mut token = session.access;
        let mut attempt = Attempt::First;

        loop {
            let reply = self
                .exchange(request, &url, token.as_ref(), attempt, request_id)
                .await?;
            if reply.status != StatusCode::UNAUTHORIZED || !attempt.may_refresh() {
                return reply.into_result();
            }

            debug!(had_token = token.is_some(), "received 401, attempting session recovery");
            match self.recover(session.epoch, request_id).await? {
                Some(fresh) => {
                    token = Some(fresh);
                    attempt = Attempt::Retry;
                }
                None => return reply.into_result(),
            }
        }
    }

    /// Obtain a usable access token after a 401 on a request that was sent
    /// under session `epoch`. `None` means the session is over.
    async fn recover(&self, epoch: u64, request_id: &str) -> Result<Option<Secret<String>>> {
        let _flight = self.inner.refresh_flight.lock().await;
        let store = &self.inner.store;
        let current = store.snapshot().await?;

        if current.epoch != epoch {
            // Someone refreshed or logged in while this request was in flight
            debug!(epoch, current = current.epoch, "session already replaced, reusing it");
            metrics::record_refresh(RefreshOutcome::Shared);
            return Ok(current.access);
        }

        let Some(refresh) = current.refresh else {
            if current.access.is_some() {
                store.clear_if(current.epoch).await?;
                info!("no refresh token stored, session terminated");
            }
            metrics::record_refresh(RefreshOutcome::Unavailable);
            return Ok(None);
        };

        match self.refresh_call(&refresh, request_id).await {
            Ok(tokens) => {
                let access = Secret::new(tokens.access);
                let pair = TokenPair {
                    access: access.clone(),
                    refresh: Some(tokens.refresh.map(Secret::new).unwrap_or(refresh)),
                };
                metrics::record_refresh(RefreshOutcome::Refreshed);
                if store.set_tokens_if(current.epoch, pair).await? {
                    info!("access token refreshed");
                    Ok(Some(access))
                } else {
                    // A login landed during the refresh; it wins
                    debug!("refresh result superseded by a newer session");
                    Ok(store.get_access().await?)
                }
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, clearing session");
                store.clear_if(current.epoch).await?;
                metrics::record_refresh(RefreshOutcome::Failed);
                Ok(None)
            }
        }
    }

    async fn refresh_call(&self, refresh: &Secret<String>, request_id: &str) -> Result<RefreshedTokens> {
        let body = RefreshRequest {
            refresh: refresh.expose(),
        };
        self.post_direct(&self.inner.config.refresh_path, &body, request_id)
            .await?
            .json()
    }

    /// Exchange username/password for a token pair and store it.
    #[instrument(skip_all, fields(username = %username))]
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let credentials = Credentials { username, password };
        credentials.check()?;

        let request_id = new_request_id();
        let tokens: LoginTokens = self
            .post_direct(&self.inner.config.login_path, &credentials, &request_id)
            .await?
            .json()?;

        self.inner
            .store
            .set_tokens(TokenPair::new(tokens.access, tokens.refresh))
            .await?;
        info!("logged in");
        Ok(())
    }

    /// Create an account. Stores nothing; the caller logs in separately.
    #[instrument(skip_all, fields(username = %registration.username))]
    pub async fn register(&self, registration: &Registration) -> Result<ApiResponse> {
        registration.check()?;
        let request_id = new_request_id();
        let response = self
            .post_direct(&self.inner.config.register_path, registration, &request_id)
            .await?;
        info!("account registered");
        Ok(response)
    }

    /// Forget both tokens. No network traffic.
    pub async fn logout(&self) -> Result<()> {
        self.inner.store.clear().await?;
        info!("logged out");
        Ok(())
    }

    /// POST without a bearer token and without the refresh path.
    async fn post_direct<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        request_id: &str,
    ) -> Result<ApiResponse> {
        let request = PendingRequest::post(path).json(body)?;
        let url = self.resolve(&request)?;
        self.exchange(&request, &url, None, Attempt::Direct, request_id)
            .await?
            .into_result()
    }

    /// Join `request.path` onto the base URL and append the query.
    ///
    /// Rejects anything that would leave the base URL's origin or path prefix.
    fn resolve(&self, request: &PendingRequest) -> Result<Url> {
        let path = request.path.as_str();
        if !path.starts_with('/') || path.starts_with("//") || path.contains("://") {
            return Err(ApiError::InvalidPath(format!(
                "{path:?} must start with '/' and be relative to the base URL"
            )));
        }

        let mut url = Url::parse(&format!("{}{}", self.inner.base, path))
            .map_err(|e| ApiError::InvalidPath(format!("{path:?}: {e}")))?;

        let prefix = self.inner.base_url.path().trim_end_matches('/');
        let under_prefix = url.path() == prefix || url.path().starts_with(&format!("{prefix}/"));
        if url.origin() != self.inner.base_url.origin() || !under_prefix {
            return Err(ApiError::InvalidPath(format!(
                "{path:?} resolves outside {}",
                self.inner.base
            )));
        }

        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    /// One HTTP exchange. Network failures are errors; every status is a `Reply`.
    async fn exchange(
        &self,
        request: &PendingRequest,
        url: &Url,
        token: Option<&Secret<String>>,
        attempt: Attempt,
        request_id: &str,
    ) -> Result<Reply> {
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .header(REQUEST_ID_HEADER, request_id);

        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose());
        }
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| ApiError::Decode(format!("encoding request body: {e}")))?;
            builder = builder.body(bytes);
        }

        let started = Instant::now();
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                metrics::record_request(
                    request.method.as_str(),
                    None,
                    attempt.label(),
                    started.elapsed().as_secs_f64(),
                );
                warn!(error = %e, attempt = attempt.label(), "no response from server");
                return Err(ApiError::Network(e));
            }
        };

        let status = response.status();
        let bytes = response.bytes().await.map_err(ApiError::Network)?;
        metrics::record_request(
            request.method.as_str(),
            Some(status.as_u16()),
            attempt.label(),
            started.elapsed().as_secs_f64(),
        );
        debug!(status = status.as_u16(), attempt = attempt.label(), "response received");

        Ok(Reply {
            status,
            body: decode_body(&bytes),
        })
    }
}

fn new_request_id() -> String {
    format!("req_{}", Uuid::new_v4().simple())
}
