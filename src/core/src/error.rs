//! Error handling for the APQP client.
//!
//! Every failure surfaced by the request core, the resource facade and the
//! session layer is an [`ApqpError`]. The error carries:
//! - a machine-readable [`ErrorCode`]
//! - the human-readable message callers display (server-supplied when present)
//! - the HTTP status for non-success responses
//! - the underlying transport/decoding error as `source`
//!
//! Permission denial is never an error; see [`crate::permissions`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use apqp_core::error::{ApqpError, ErrorCode, Result};
//!
//! match api.projects().get(42).await {
//!     Ok(project) => println!("{}", project.name),
//!     Err(e) if e.status() == Some(404) => println!("no such project"),
//!     Err(e) => return Err(e),
//! }
//! ```

use metrics::counter;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for client operations.
pub type Result<T> = std::result::Result<T, ApqpError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Transport (1000-1099)
    Network,
    InvalidUrl,

    // Response (1100-1199)
    HttpStatus,
    Decode,

    // Authentication (2000-2099)
    InvalidCredentials,
    LoginFailed,
    LogoutFailed,

    // Local (3000-3099)
    Serialization,
    Configuration,
    Io,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub const fn numeric_code(&self) -> u32 {
        match self {
            Self::Network => 1000,
            Self::InvalidUrl => 1001,

            Self::HttpStatus => 1100,
            Self::Decode => 1101,

            Self::InvalidCredentials => 2000,
            Self::LoginFailed => 2001,
            Self::LogoutFailed => 2002,

            Self::Serialization => 3000,
            Self::Configuration => 3001,
            Self::Io => 3002,
        }
    }

    /// Get the error category for grouping.
    pub const fn category(&self) -> &'static str {
        match self.numeric_code() {
            1000..=1099 => "transport",
            1100..=1199 => "response",
            2000..=2099 => "authentication",
            3000..=3099 => "local",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Error Severity
// ═══════════════════════════════════════════════════════════════════════════════

/// Severity level for errors (selects the log level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Expected user-facing outcomes (bad credentials, 4xx responses)
    Low,
    /// Backend or session problems worth noticing
    Medium,
    /// Transport failures and malformed payloads
    High,
}

impl ErrorSeverity {
    /// Get severity based on error code and, for HTTP errors, the status.
    pub const fn from_code(code: &ErrorCode, status: Option<u16>) -> Self {
        match code {
            ErrorCode::HttpStatus => match status {
                Some(s) if s >= 500 => Self::Medium,
                _ => Self::Low,
            },
            ErrorCode::InvalidCredentials => Self::Low,
            ErrorCode::LoginFailed | ErrorCode::LogoutFailed | ErrorCode::Configuration => {
                Self::Medium
            }
            ErrorCode::Network
            | ErrorCode::InvalidUrl
            | ErrorCode::Decode
            | ErrorCode::Serialization
            | ErrorCode::Io => Self::High,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The error type for every fallible client operation.
#[derive(Error, Debug)]
pub struct ApqpError {
    code: ErrorCode,

    /// Message shown to the caller.
    message: Cow<'static, str>,

    /// HTTP status for `HttpStatus` errors.
    status: Option<u16>,

    /// Endpoint the failing request targeted, if any.
    endpoint: Option<String>,

    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for ApqpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl ApqpError {
    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new error with code and message.
    pub fn new(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        let error = Self {
            code,
            message: message.into(),
            status: None,
            endpoint: None,
            source: None,
        };
        error.record_metrics();
        error
    }

    /// A non-success HTTP response. `message` is the server-supplied `error`
    /// field when present, else the generic `HTTP error <status>` text.
    pub fn http_status(status: u16, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("HTTP error {}", status));
        let mut error = Self::new(ErrorCode::HttpStatus, message);
        error.status = Some(status);
        error
    }

    /// A transport-level failure; the message is the transport error's own.
    pub fn network(source: reqwest::Error) -> Self {
        Self::new(ErrorCode::Network, source.to_string()).with_source(source)
    }

    /// A response body that does not match the expected schema.
    pub fn decode(type_name: &str, source: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::Decode,
            format!("Failed to decode {}: {}", type_name, source),
        )
        .with_source(source)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials, "Invalid credentials")
    }

    pub fn login_failed() -> Self {
        Self::new(ErrorCode::LoginFailed, "Login failed")
    }

    pub fn logout_failed() -> Self {
        Self::new(ErrorCode::LogoutFailed, "Logout failed")
    }

    /// A base URL or endpoint that does not form a valid URL.
    pub fn invalid_url<E>(input: &str, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::new(
            ErrorCode::InvalidUrl,
            format!("Invalid URL '{}': {}", input, source),
        )
        .with_source(source)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Configuration, message.into())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Record the endpoint the failing request targeted.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status of a non-success response.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::from_code(&self.code, self.status)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Logging
    // ─────────────────────────────────────────────────────────────────────────

    /// Log this error with appropriate severity.
    pub fn log(&self) {
        let code = self.code.to_string();
        let category = self.code.category();
        let endpoint = self.endpoint.as_deref().unwrap_or("-");

        match self.severity() {
            ErrorSeverity::High => {
                error!(
                    error_code = %code,
                    category = category,
                    endpoint = endpoint,
                    message = %self.message,
                    source = ?self.source,
                    "API request failed"
                );
            }
            ErrorSeverity::Medium => {
                warn!(
                    error_code = %code,
                    category = category,
                    endpoint = endpoint,
                    http_status = ?self.status,
                    message = %self.message,
                    "API request failed"
                );
            }
            ErrorSeverity::Low => {
                tracing::info!(
                    error_code = %code,
                    category = category,
                    endpoint = endpoint,
                    http_status = ?self.status,
                    message = %self.message,
                    "API request rejected"
                );
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Metrics
    // ─────────────────────────────────────────────────────────────────────────

    fn record_metrics(&self) {
        counter!(
            "apqp_client_errors_total",
            "code" => self.code.to_string(),
            "category" => self.code.category().to_string(),
        )
        .increment(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// From Implementations for Common Error Types
// ═══════════════════════════════════════════════════════════════════════════════

impl From<reqwest::Error> for ApqpError {
    fn from(error: reqwest::Error) -> Self {
        Self::network(error)
    }
}

impl From<serde_json::Error> for ApqpError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::Serialization, error.to_string()).with_source(error)
    }
}

impl From<config::ConfigError> for ApqpError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string()).with_source(error)
    }
}

impl From<std::io::Error> for ApqpError {
    fn from(error: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, error.to_string()).with_source(error)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
