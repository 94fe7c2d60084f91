//! Authenticated HTTP client for the mini-overflow Q&A API
//!
//! `ApiClient` attaches the stored access token to every request and, on a
//! 401, refreshes it once through the refresh endpoint and re-sends the
//! original request. Callers see either the retried response or the original
//! 401 after the session has been cleared.
//!
//! Tokens live behind `session_store::SessionStore`; the client never reads
//! ambient global state.

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod metrics;
pub mod request;

#[cfg(test)]
mod mock;

pub use auth::{Credentials, Registration, require};
pub use client::{ApiClient, REQUEST_ID_HEADER};
pub use config::ClientConfig;
pub use envelope::Listing;
pub use error::{ApiError, Result};
pub use crate::metrics::RefreshOutcome;
pub use request::{ApiResponse, PendingRequest};
pub use reqwest::{Method, StatusCode};
