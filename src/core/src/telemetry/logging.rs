//! Structured logging with JSON/pretty/compact formats and sensitive data redaction.
//!
//! Log output goes to stderr so that command output on stdout stays clean.
//! Request logging runs CSRF tokens, session cookies and credentials through
//! [`SensitiveFieldRedactor`] before they reach a subscriber.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Global redactor instance for sensitive data.
static REDACTOR: OnceLock<SensitiveFieldRedactor> = OnceLock::new();

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (json, pretty or compact)
    #[serde(default)]
    pub format: LogFormat,

    /// Per-module log levels
    #[serde(default)]
    pub module_levels: HashMap<String, String>,

    /// Whether to include file/line information
    #[serde(default)]
    pub include_location: bool,

    /// Whether to include target (module path)
    #[serde(default = "default_include_target")]
    pub include_target: bool,

    /// Redaction configuration
    #[serde(default)]
    pub redaction: RedactionConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            module_levels: HashMap::new(),
            include_location: false,
            include_target: default_include_target(),
            redaction: RedactionConfig::default(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format for log shipping
    Json,
    /// Multi-line format for debugging
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

/// Configuration for sensitive data redaction.
#[derive(Debug, Clone, Deserialize)]
pub struct RedactionConfig {
    /// Whether redaction is enabled
    #[serde(default = "default_redaction_enabled")]
    pub enabled: bool,

    /// Patterns to redact
    #[serde(default = "default_redaction_patterns")]
    pub patterns: Vec<RedactionPattern>,

    /// Replacement text for redacted values
    #[serde(default = "default_redaction_replacement")]
    pub replacement: String,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: default_redaction_enabled(),
            patterns: default_redaction_patterns(),
            replacement: default_redaction_replacement(),
        }
    }
}

/// A pattern for identifying sensitive data to redact.
#[derive(Debug, Clone, Deserialize)]
pub struct RedactionPattern {
    /// Name of this pattern (for debugging)
    pub name: String,

    /// Field names to match (case-insensitive, substring)
    #[serde(default)]
    pub field_names: Vec<String>,

    /// Regex pattern to match in values
    #[serde(default)]
    pub value_pattern: Option<String>,
}

/// Redactor for sensitive fields in log output.
#[derive(Debug, Clone)]
pub struct SensitiveFieldRedactor {
    patterns: Vec<CompiledRedactionPattern>,
    replacement: String,
    enabled: bool,
}

#[derive(Debug, Clone)]
struct CompiledRedactionPattern {
    field_names: Vec<String>,
    value_regex: Option<regex::Regex>,
}

impl SensitiveFieldRedactor {
    /// Create a new redactor from configuration. Patterns whose regex fails to
    /// compile keep only their field-name matching.
    pub fn new(config: &RedactionConfig) -> Self {
        let patterns = config
            .patterns
            .iter()
            .map(|p| CompiledRedactionPattern {
                field_names: p.field_names.iter().map(|s| s.to_lowercase()).collect(),
                value_regex: p
                    .value_pattern
                    .as_ref()
                    .and_then(|pat| regex::Regex::new(pat).ok()),
            })
            .collect();

        Self {
            patterns,
            replacement: config.replacement.clone(),
            enabled: config.enabled,
        }
    }

    /// Check if a field name should be redacted.
    pub fn should_redact_field(&self, field_name: &str) -> bool {
        if !self.enabled {
            return false;
        }

        let lower = field_name.to_lowercase();
        self.patterns
            .iter()
            .any(|p| p.field_names.iter().any(|f| lower.contains(f)))
    }

    /// Redact a value if it matches any pattern.
    pub fn redact_value(&self, value: &str) -> String {
        if !self.enabled {
            return value.to_string();
        }

        let mut result = value.to_string();
        for pattern in &self.patterns {
            if let Some(regex) = &pattern.value_regex {
                result = regex.replace_all(&result, self.replacement.as_str()).to_string();
            }
        }
        result
    }

    /// Redact a field value, checking both field name and value patterns.
    pub fn redact(&self, field_name: &str, value: &str) -> String {
        if !self.enabled {
            return value.to_string();
        }

        if self.should_redact_field(field_name) {
            return self.replacement.clone();
        }

        self.redact_value(value)
    }

    /// Get the global redactor instance.
    pub fn global() -> &'static SensitiveFieldRedactor {
        REDACTOR.get_or_init(|| SensitiveFieldRedactor::new(&RedactionConfig::default()))
    }
}

// Default value functions
fn default_log_level() -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string())
}

fn default_include_target() -> bool {
    true
}

fn default_redaction_enabled() -> bool {
    true
}

fn default_redaction_replacement() -> String {
    "[REDACTED]".to_string()
}

fn default_redaction_patterns() -> Vec<RedactionPattern> {
    vec![
        RedactionPattern {
            name: "passwords".to_string(),
            field_names: vec![
                "password".to_string(),
                "passwd".to_string(),
                "secret".to_string(),
                "credential".to_string(),
            ],
            value_pattern: Some(r"(?i)password=[^&\s]*".to_string()),
        },
        RedactionPattern {
            name: "csrf".to_string(),
            field_names: vec![
                "csrf".to_string(),
                "xsrf".to_string(),
                "token".to_string(),
            ],
            value_pattern: Some(r"csrftoken=[^;\s]+".to_string()),
        },
        RedactionPattern {
            name: "session_cookies".to_string(),
            field_names: vec![
                "cookie".to_string(),
                "sessionid".to_string(),
                "authorization".to_string(),
            ],
            value_pattern: Some(r"sessionid=[^;\s]+".to_string()),
        },
    ]
}

/// Initialize the logging subsystem.
///
/// Installs a global `tracing` subscriber filtered by `config.level` plus any
/// per-module directives. Fails if a directive does not parse or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let _ = REDACTOR.set(SensitiveFieldRedactor::new(&config.redaction));

    let mut filter = EnvFilter::try_new(&config.level)?;
    for (module, level) in &config.module_levels {
        let directive = format!("{}={}", module, level);
        filter = filter.add_directive(directive.parse()?);
    }

    match config.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(config.include_target);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_writer(std::io::stderr)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(config.include_target);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_target(config.include_target);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction_patterns() {
        let redactor = SensitiveFieldRedactor::new(&RedactionConfig::default());

        assert!(redactor.should_redact_field("password"));
        assert!(redactor.should_redact_field("csrf_token"));
        assert!(redactor.should_redact_field("X-CSRFToken"));
        assert!(redactor.should_redact_field("Cookie"));
        assert!(!redactor.should_redact_field("username"));
        assert!(!redactor.should_redact_field("endpoint"));

        let cookies = "csrftoken=abc123; sessionid=s3cr3t";
        assert_eq!(redactor.redact_value(cookies), "[REDACTED]; [REDACTED]");

        let form = "username=alice&password=hunter2";
        assert_eq!(redactor.redact_value(form), "username=alice&[REDACTED]");

        assert_eq!(redactor.redact_value("/api/projects/42/"), "/api/projects/42/");
    }

    #[test]
    fn test_redaction_disabled() {
        let config = RedactionConfig {
            enabled: false,
            ..RedactionConfig::default()
        };
        let redactor = SensitiveFieldRedactor::new(&config);
        assert_eq!(redactor.redact("password", "hunter2"), "hunter2");
    }

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.redaction.enabled);
    }
}
