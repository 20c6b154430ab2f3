//! Telemetry: structured logging and client-side metrics.
//!
//! - **Logging**: `tracing-subscriber` with JSON/pretty/compact output and
//!   redaction of credentials, CSRF tokens and session cookies
//! - **Metrics**: `metrics` facade counters and histograms for outbound
//!   requests; the embedding application decides whether to install a recorder
//!
//! # Example
//!
//! ```rust,no_run
//! use apqp_core::telemetry::{init_logging, LoggingConfig};
//!
//! init_logging(&LoggingConfig::default()).expect("Failed to initialize logging");
//! ```

pub mod logging;
pub mod metrics;

pub use logging::{
    init_logging, LogFormat, LoggingConfig, RedactionConfig, RedactionPattern,
    SensitiveFieldRedactor,
};
pub use metrics::{describe_metrics, RequestMetrics};
