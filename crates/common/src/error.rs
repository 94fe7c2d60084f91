//! Configuration error types shared by the front ends

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A setting is missing or has an unusable value
    #[error("Configuration error: {0}")]
    Config(String),

    /// The config file exists but could not be read
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No config file and no environment fallback for the required settings
    #[error("config file {} not found and {env} is not set", path.display())]
    NotFound { path: PathBuf, env: &'static str },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias for configuration loading
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_the_problem() {
        let err = Error::Config("api.base_url is required".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: api.base_url is required"
        );
    }

    #[test]
    fn read_error_names_the_file() {
        let err = Error::Read {
            path: PathBuf::from("/etc/overflow.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "failed to read /etc/overflow.toml: denied");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn not_found_points_at_env_fallback() {
        let err = Error::NotFound {
            path: PathBuf::from("overflow.toml"),
            env: "OVERFLOW_API_URL",
        };
        assert_eq!(
            err.to_string(),
            "config file overflow.toml not found and OVERFLOW_API_URL is not set"
        );
    }

    #[test]
    fn toml_error_converts() {
        let parse: std::result::Result<toml::Table, _> = toml::from_str("[api\nbase_url = ");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Toml(_)), "got: {err:?}");
    }
}
