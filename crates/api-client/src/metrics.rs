//! Client-side request and refresh metrics
//!
//! - `api_client_requests_total` (counter): labels `method`, `status`, `attempt`
//! - `api_client_request_duration_seconds` (histogram): label `status`
//! - `api_client_token_refresh_total` (counter): label `outcome`
//!
//! `status` is the numeric HTTP status, or `network` when no response
//! arrived. Without an installed recorder every call is a no-op.

/// Outcome of one pass through the refresh path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New access token obtained and stored
    Refreshed,
    /// Another task already replaced the session; its token was reused
    Shared,
    /// No refresh token stored
    Unavailable,
    /// Refresh endpoint rejected the token or could not be reached
    Failed,
}

impl RefreshOutcome {
    pub fn label(self) -> &'static str {
        match self {
            RefreshOutcome::Refreshed => "refreshed",
            RefreshOutcome::Shared => "shared",
            RefreshOutcome::Unavailable => "unavailable",
            RefreshOutcome::Failed => "failed",
        }
    }
}

/// Record one HTTP attempt.
pub fn record_request(method: &str, status: Option<u16>, attempt: &'static str, duration_secs: f64) {
    let status_label = status.map_or_else(|| "network".to_string(), |s| s.to_string());
    metrics::counter!(
        "api_client_requests_total",
        "method" => method.to_string(),
        "status" => status_label.clone(),
        "attempt" => attempt
    )
    .increment(1);
    metrics::histogram!("api_client_request_duration_seconds", "status" => status_label)
        .record(duration_secs);
}

/// Record a pass through the refresh path.
pub fn record_refresh(outcome: RefreshOutcome) {
    metrics::counter!("api_client_token_refresh_total", "outcome" => outcome.label()).increment(1);
}
