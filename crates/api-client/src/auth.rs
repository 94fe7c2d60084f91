//! Login, registration and refresh payloads
//!
//! The backend issues JWT pairs: login returns `{access, refresh}`, refresh
//! accepts `{refresh}` and returns `{access}` plus a new `refresh` when
//! rotation is enabled.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Username/password pair posted to the login endpoint.
#[derive(Serialize)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl Credentials<'_> {
    pub(crate) fn check(&self) -> Result<()> {
        require("username", self.username)?;
        require("password", self.password)
    }
}

/// Account creation payload. `password2` is the confirmation field the
/// backend compares against `password`.
#[derive(Clone, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

impl Registration {
    /// Build a registration where the confirmation repeats the password.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            email: email.into(),
            password2: password.clone(),
            password,
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        require("username", &self.username)?;
        require("email", &self.email)?;
        require("password", &self.password)?;
        require("password2", &self.password2)
    }
}

impl std::fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Login endpoint response.
#[derive(Deserialize)]
pub(crate) struct LoginTokens {
    pub access: String,
    pub refresh: String,
}

/// Refresh endpoint request body.
#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Refresh endpoint response.
#[derive(Deserialize)]
pub(crate) struct RefreshedTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Reject empty or whitespace-only required fields before any network call.
pub fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApiError::MissingField(field));
    }
    Ok(())
}
