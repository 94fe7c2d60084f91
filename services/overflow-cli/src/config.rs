//! Configuration types and loading
//!
//! Config precedence: env vars > config file > defaults. The config file
//! path comes from `--config`, then `OVERFLOW_CONFIG`, then `overflow.toml`.
//! A missing file is accepted when `OVERFLOW_API_URL` supplies the base URL.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use api_client::ClientConfig;
use serde::Deserialize;

pub const CONFIG_ENV: &str = "OVERFLOW_CONFIG";
pub const API_URL_ENV: &str = "OVERFLOW_API_URL";
pub const SESSION_FILE_ENV: &str = "OVERFLOW_SESSION_FILE";

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Backend connection settings
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Where the token pair is persisted
#[derive(Debug, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let mut config: Config = match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound && std::env::var_os(API_URL_ENV).is_some() => {
                Config::default()
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(common::Error::NotFound {
                    path: path.to_path_buf(),
                    env: API_URL_ENV,
                });
            }
            Err(source) => {
                return Err(common::Error::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api.base_url = Some(url);
        }
        if let Ok(file) = std::env::var(SESSION_FILE_ENV) {
            config.session.path = Some(PathBuf::from(file));
        }

        let base_url = config
            .api
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| common::Error::Config("api.base_url is required".into()))?;

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {base_url}"
            )));
        }

        if config.api.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(config)
    }

    /// Resolve config file path from CLI arg or OVERFLOW_CONFIG env var.
    pub fn resolve_path(cli_path: Option<&Path>) -> PathBuf {
        if let Some(p) = cli_path {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(p);
        }
        PathBuf::from("overflow.toml")
    }

    /// Session file location: configured path, else `~/.config/overflow/session.json`,
    /// else `overflow-session.json` in the working directory.
    pub fn session_path(&self) -> PathBuf {
        if let Some(p) = &self.session.path {
            return p.clone();
        }
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home)
                .join(".config")
                .join("overflow")
                .join("session.json"),
            None => PathBuf::from("overflow-session.json"),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            ..ClientConfig::default()
        }
        .with_timeout(Duration::from_secs(self.api.timeout_secs))
    }
}
