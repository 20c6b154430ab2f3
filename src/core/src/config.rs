//! Configuration management.
//!
//! Layered with the `config` crate: built-in defaults, then an optional file,
//! then `APQP__`-prefixed environment variables (`APQP__API__BASE_URL`, ...).

use std::time::Duration;

use serde::Deserialize;

use crate::error::{ApqpError, Result};
use crate::telemetry::LoggingConfig;

/// Main client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Session endpoint configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend root URL; endpoints such as `/api/projects/` are joined to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Form-encoded login endpoint (outside the JSON API)
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Logout endpoint
    #[serde(default = "default_logout_path")]
    pub logout_path: String,

    /// Permission-introspection endpoint probed by the auth check
    #[serde(default = "default_permissions_path")]
    pub permissions_path: String,

    /// Cookie the CSRF token is read from
    #[serde(default = "default_csrf_cookie")]
    pub csrf_cookie: String,

    /// Header the CSRF token is sent in
    #[serde(default = "default_csrf_header")]
    pub csrf_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            logout_path: default_logout_path(),
            permissions_path: default_permissions_path(),
            csrf_cookie: default_csrf_cookie(),
            csrf_header: default_csrf_header(),
        }
    }
}

// Default value functions
fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_timeout() -> Duration { Duration::from_secs(30) }
fn default_user_agent() -> String { format!("apqp-client/{}", env!("CARGO_PKG_VERSION")) }
fn default_login_path() -> String { "/login/".to_string() }
fn default_logout_path() -> String { "/logout/".to_string() }
fn default_permissions_path() -> String { "/api/users/permissions/".to_string() }
fn default_csrf_cookie() -> String { "csrftoken".to_string() }
fn default_csrf_header() -> String { "X-CSRFToken".to_string() }

impl ClientConfig {
    /// Load configuration from `.env` and the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("APQP").separator("__"))
            .build()?;

        let cfg: ClientConfig = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a specific file path, with environment overrides on top.
    pub fn from_file(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("APQP").separator("__"))
            .build()?;

        let cfg: ClientConfig = config.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject settings the client cannot be built from.
    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.api.base_url)
            .map_err(|e| ApqpError::invalid_url(&self.api.base_url, e))?;

        for (name, path) in [
            ("auth.login_path", &self.auth.login_path),
            ("auth.logout_path", &self.auth.logout_path),
            ("auth.permissions_path", &self.auth.permissions_path),
        ] {
            if !path.starts_with('/') {
                return Err(ApqpError::configuration(format!(
                    "{} must start with '/': {}",
                    name, path
                )));
            }
        }

        if self.auth.csrf_cookie.is_empty() || self.auth.csrf_header.is_empty() {
            return Err(ApqpError::configuration(
                "auth.csrf_cookie and auth.csrf_header must not be empty",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.api.base_url, "http://localhost:8000");
        assert_eq!(cfg.api.timeout, Duration::from_secs(30));
        assert_eq!(cfg.auth.login_path, "/login/");
        assert_eq!(cfg.auth.csrf_cookie, "csrftoken");
        assert_eq!(cfg.auth.csrf_header, "X-CSRFToken");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[api]
base_url = "https://quality.example.com"
timeout = "5s"

[auth]
permissions_path = "/api/me/permissions/"
"#
        )
        .unwrap();

        let cfg = ClientConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.api.base_url, "https://quality.example.com");
        assert_eq!(cfg.api.timeout, Duration::from_secs(5));
        assert_eq!(cfg.auth.permissions_path, "/api/me/permissions/");
        assert_eq!(cfg.auth.logout_path, "/logout/");
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut cfg = ClientConfig::default();
        cfg.api.base_url = "not a url".to_string();
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::InvalidUrl);
    }

    #[test]
    fn test_validate_rejects_relative_path() {
        let mut cfg = ClientConfig::default();
        cfg.auth.login_path = "login/".to_string();
        assert!(cfg.validate().is_err());
    }
}
